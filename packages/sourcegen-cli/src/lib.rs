//! Sourcegen CLI
//!
//! Loads a `sourcegen.json` project file, turns its generator table into a
//! registry of template generators and runs the transform over the matched
//! files.

pub mod config;
pub mod perform_transform;
pub mod template;

pub use config::{AnnotationMatcher, GeneratorConfig, SourcegenConfig, DEFAULT_CONFIG_FILE};
pub use perform_transform::{perform_transform, FileReport, OutputMode, TransformRequest, TransformSummary};
pub use template::TemplateGenerator;
