//! Read-only view handed to a generator for one generation call.

use once_cell::unsync::OnceCell;

use crate::error::ContextError;
use crate::locator::MatchRecord;
use crate::syntax::{Annotation, Argument, Declaration, Span, SyntaxTree};

pub struct GenerationContext<'t> {
    tree: &'t SyntaxTree,
    record: MatchRecord<'t>,
    arguments_text: OnceCell<Option<String>>,
    target_text: OnceCell<&'t str>,
}

impl<'t> GenerationContext<'t> {
    pub fn new(tree: &'t SyntaxTree, record: MatchRecord<'t>) -> Self {
        Self {
            tree,
            record,
            arguments_text: OnceCell::new(),
            target_text: OnceCell::new(),
        }
    }

    /// The tree the target was found in.
    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn source(&self) -> &'t str {
        self.tree.source()
    }

    /// The matched declaration.
    pub fn target(&self) -> &'t Declaration {
        self.record.target
    }

    /// The decorator that selected the generator.
    pub fn annotation(&self) -> &'t Annotation {
        self.record.annotation
    }

    /// Captured arguments: `None` for `@Foo`, `Some(&[])` for `@Foo()`.
    pub fn arguments(&self) -> Option<&'t [Argument]> {
        self.record.arguments()
    }

    /// Registry index of the generator being invoked.
    pub fn generator_index(&self) -> usize {
        self.record.generator_index
    }

    /// Argument texts joined by `,` without added whitespace, or `None` when
    /// the decorator was written without call syntax. Computed once.
    pub fn rendered_arguments(&self) -> Result<Option<&str>, ContextError> {
        let rendered = self.arguments_text.get_or_try_init(|| -> Result<_, ContextError> {
            let Some(arguments) = self.arguments() else {
                return Ok(None);
            };
            let parts = arguments
                .iter()
                .map(|arg| {
                    self.tree
                        .text(arg.span)
                        .ok_or_else(|| ContextError::MalformedArguments {
                            annotation: self.annotation().name.clone(),
                            start: arg.span.start,
                            end: arg.span.end,
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(parts.join(",")))
        })?;
        Ok(rendered.as_deref())
    }

    /// Exact source text of the target declaration. Computed once.
    pub fn rendered_target(&self) -> Result<&'t str, ContextError> {
        self.target_text
            .get_or_try_init(|| self.slice_target(self.target().span))
            .copied()
    }

    /// Exact source text of the matched decorator, `@` included.
    pub fn rendered_annotation(&self) -> Result<&'t str, ContextError> {
        self.slice_target(self.annotation().span)
    }

    /// Target text with the matched decorator, and the whitespace right
    /// after it, cut out. Other decorators are kept.
    pub fn undecorated_target(&self) -> Result<String, ContextError> {
        let target = self.target().span;
        let annotation = self.annotation().span;
        let before = self.slice_target(Span::new(target.start, annotation.start))?;
        let after = self.slice_target(Span::new(annotation.end, target.end))?;
        Ok(format!("{}{}", before, after.trim_start()))
    }

    fn slice_target(&self, span: Span) -> Result<&'t str, ContextError> {
        self.tree.text(span).ok_or(ContextError::MalformedTarget {
            start: span.start,
            end: span.end,
        })
    }
}
