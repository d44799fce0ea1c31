//! Transform driver.
//!
//! Runs `Scanning -> Generating -> Splicing -> Reparsing` until a scan finds
//! nothing. Each iteration rewrites exactly one declaration and rebuilds the
//! tree from the new text; no node of an old tree survives an edit.

use futures::executor::block_on;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::context::GenerationContext;
use crate::error::TransformError;
use crate::locator::find_target;
use crate::registry::GeneratorRegistry;
use crate::syntax::{Parser, Span, SyntaxKind, SyntaxTree};

/// Driver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformState {
    /// Looking for the next target in the current tree.
    Scanning,
    /// Awaiting the matched generator.
    Generating,
    /// Building the new text around the replacement.
    Splicing,
    /// Parsing the new text into a fresh tree.
    Reparsing,
    /// A scan found no target; the current tree is the result.
    Done,
}

impl fmt::Display for TransformState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransformState::Scanning => "scanning",
            TransformState::Generating => "generating",
            TransformState::Splicing => "splicing",
            TransformState::Reparsing => "reparsing",
            TransformState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Cooperative cancellation flag, checked before every scan.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    /// Upper bound on rewrites. `None` lets a generator that re-emits its
    /// own decorator loop forever.
    pub max_iterations: Option<usize>,
    pub cancellation: Option<CancellationToken>,
}

impl TransformOptions {
    pub fn with_max_iterations(mut self, limit: usize) -> Self {
        self.max_iterations = Some(limit);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// Record of one completed iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub iteration: usize,
    pub generator: String,
    pub annotation: String,
    pub kind: SyntaxKind,
    /// Range of the replaced declaration in the text of that iteration.
    pub span: Span,
    pub replacement_len: usize,
}

/// Final tree plus what was rewritten on the way there.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub tree: SyntaxTree,
    pub rewrites: Vec<Rewrite>,
}

impl TransformOutput {
    pub fn source(&self) -> &str {
        self.tree.source()
    }

    pub fn into_source(self) -> String {
        self.tree.source().to_string()
    }

    pub fn iterations(&self) -> usize {
        self.rewrites.len()
    }

    pub fn is_unchanged(&self) -> bool {
        self.rewrites.is_empty()
    }
}

pub struct Transformer<P> {
    parser: P,
    registry: GeneratorRegistry,
    options: TransformOptions,
}

impl<P: Parser> Transformer<P> {
    pub fn new(parser: P, registry: GeneratorRegistry) -> Self {
        Self {
            parser,
            registry,
            options: TransformOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TransformOptions) -> Self {
        self.options = options;
        self
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    /// Parse `source` and transform it.
    pub async fn transform_source(&self, source: &str) -> Result<TransformOutput, TransformError> {
        let tree = self.parser.parse(source)?;
        self.transform(tree).await
    }

    /// Rewrite `tree` until no declaration is claimed by a generator.
    pub async fn transform(&self, mut tree: SyntaxTree) -> Result<TransformOutput, TransformError> {
        let mut rewrites: Vec<Rewrite> = Vec::new();

        loop {
            // Scanning
            if let Some(token) = &self.options.cancellation {
                if token.is_cancelled() {
                    return Err(TransformError::Cancelled {
                        iterations: rewrites.len(),
                    });
                }
            }

            let located = find_target(&tree, &self.registry).and_then(|record| {
                self.registry
                    .get(record.generator_index)
                    .map(|descriptor| (descriptor, record))
            });
            let Some((descriptor, record)) = located else {
                debug!(state = %TransformState::Done, iterations = rewrites.len());
                break;
            };

            if let Some(limit) = self.options.max_iterations {
                if rewrites.len() >= limit {
                    warn!(limit, "iteration limit reached with targets remaining");
                    return Err(TransformError::IterationLimit { limit });
                }
            }

            let iteration = rewrites.len() + 1;
            let span = record.target.span;
            let kind = record.target.kind;
            let annotation = record.annotation.name.clone();

            // Generating
            debug!(
                state = %TransformState::Generating,
                iteration,
                generator = descriptor.label(),
                annotation = %annotation,
                kind = %kind,
                span = %span
            );
            let context = GenerationContext::new(&tree, record);
            let replacement = descriptor
                .generator()
                .generate(&context)
                .await
                .map_err(|err| TransformError::from_generator(descriptor.label(), err))?;
            drop(context);

            // Splicing
            debug!(state = %TransformState::Splicing, iteration, replacement_len = replacement.len());
            let text = splice(tree.source(), span, &replacement)?;

            // Reparsing
            debug!(state = %TransformState::Reparsing, iteration, len = text.len());
            tree = self
                .parser
                .parse(&text)
                .map_err(|source| TransformError::Reparse { iteration, source })?;

            rewrites.push(Rewrite {
                iteration,
                generator: descriptor.label().to_string(),
                annotation,
                kind,
                span,
                replacement_len: replacement.len(),
            });
        }

        info!(iterations = rewrites.len(), "transform settled");
        Ok(TransformOutput { tree, rewrites })
    }

    /// [`Transformer::transform`] driven to completion on the current thread.
    pub fn transform_blocking(&self, tree: SyntaxTree) -> Result<TransformOutput, TransformError> {
        block_on(self.transform(tree))
    }

    /// [`Transformer::transform_source`] driven to completion on the current thread.
    pub fn transform_source_blocking(&self, source: &str) -> Result<TransformOutput, TransformError> {
        block_on(self.transform_source(source))
    }
}

/// `source[..start] + replacement + source[end..]`.
pub fn splice(source: &str, span: Span, replacement: &str) -> Result<String, TransformError> {
    let invalid = || TransformError::InvalidRange {
        start: span.start,
        end: span.end,
        len: source.len(),
    };
    let head = source.get(..span.start).ok_or_else(invalid)?;
    let tail = source.get(span.end..).ok_or_else(invalid)?;
    if span.start > span.end {
        return Err(invalid());
    }

    let mut text = String::with_capacity(head.len() + replacement.len() + tail.len());
    text.push_str(head);
    text.push_str(replacement);
    text.push_str(tail);
    Ok(text)
}
