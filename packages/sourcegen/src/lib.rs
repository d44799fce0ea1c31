#![deny(clippy::all)]

//! Decorator-driven source rewriting.
//!
//! A [`Transformer`] repeatedly locates the first declaration whose decorator
//! is claimed by a registered generator, hands it to that generator, splices
//! the returned text over the declaration and re-parses the whole file. The
//! loop ends once a scan finds nothing left to rewrite.
//!
//! ```no_run
//! use sourcegen::generator::from_fn;
//! use sourcegen::{GeneratorDescriptor, GeneratorRegistry, SyntaxKinds, Transformer, TypeScriptParser};
//!
//! let registry = GeneratorRegistry::new().with(
//!     GeneratorDescriptor::exact("getter", "Gen", from_fn(|ctx| {
//!         Ok(format!("get value() {{ return {}; }}", ctx.rendered_arguments()?.unwrap_or("null")))
//!     }))
//!     .with_kinds(SyntaxKinds::MEMBERS),
//! );
//!
//! let transformer = Transformer::new(TypeScriptParser::new(), registry);
//! let output = transformer
//!     .transform_source_blocking("class A { @Gen(1) value() {} }")
//!     .unwrap();
//! assert_eq!(output.source(), "class A { get value() { return 1; } }");
//! ```

pub mod context;
pub mod driver;
pub mod error;
pub mod generator;
pub mod locator;
pub mod registry;
pub mod syntax;

pub use context::GenerationContext;
pub use driver::{
    CancellationToken, Rewrite, TransformOptions, TransformOutput, TransformState, Transformer,
};
pub use error::{ContextError, ParseError, TransformError};
pub use generator::{FnGenerator, Generator};
pub use locator::{find_target, MatchRecord};
pub use registry::{GeneratorDescriptor, GeneratorRegistry, NameMatcher};
pub use syntax::{
    Annotation, Argument, Declaration, Parser, Span, SyntaxKind, SyntaxKinds, SyntaxTree,
    TypeScriptParser,
};

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
