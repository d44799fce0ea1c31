//! Errors raised while parsing, rendering and rewriting.

use thiserror::Error;

/// The parser collaborator rejected a source text.
#[derive(Debug, Clone, Error)]
#[error("parse error: {message}")]
pub struct ParseError {
    pub message: String,
    /// Every diagnostic the parser reported, first one included.
    pub diagnostics: Vec<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Vec<String>) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

/// A [`GenerationContext`](crate::GenerationContext) could not render a range
/// of the source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("arguments of `@{annotation}` cannot be rendered: range {start}..{end} is not valid in the source")]
    MalformedArguments {
        annotation: String,
        start: usize,
        end: usize,
    },

    #[error("target range {start}..{end} is not valid in the source")]
    MalformedTarget { start: usize, end: usize },
}

/// Failure of a whole transform. The transform is not transactional: no
/// partially rewritten text accompanies any of these.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The input text did not parse.
    #[error(transparent)]
    Parse(ParseError),

    /// A generator failed; `source` is the generator's own error.
    #[error("generator `{generator}` failed: {source}")]
    Generation {
        generator: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("generator `{generator}`: {source}")]
    MalformedArguments {
        generator: String,
        #[source]
        source: ContextError,
    },

    #[error("generator `{generator}`: {source}")]
    MalformedTarget {
        generator: String,
        #[source]
        source: ContextError,
    },

    /// The target range does not satisfy `start <= end <= len`.
    #[error("cannot splice {start}..{end} into a source of {len} bytes")]
    InvalidRange { start: usize, end: usize, len: usize },

    /// The spliced text of iteration `iteration` did not parse.
    #[error("rewritten source of iteration {iteration} does not parse: {source}")]
    Reparse {
        iteration: usize,
        #[source]
        source: ParseError,
    },

    #[error("transform did not settle within {limit} iterations")]
    IterationLimit { limit: usize },

    #[error("transform cancelled after {iterations} iterations")]
    Cancelled { iterations: usize },
}

impl TransformError {
    /// Classify a generator error, keeping rendering failures apart from
    /// failures of the generator's own logic.
    pub(crate) fn from_generator(generator: &str, error: anyhow::Error) -> Self {
        let generator = generator.to_string();
        match error.downcast::<ContextError>() {
            Ok(source @ ContextError::MalformedArguments { .. }) => {
                TransformError::MalformedArguments { generator, source }
            }
            Ok(source @ ContextError::MalformedTarget { .. }) => {
                TransformError::MalformedTarget { generator, source }
            }
            Err(source) => TransformError::Generation { generator, source },
        }
    }

    /// The generator error behind a [`TransformError::Generation`].
    pub fn generator_error(&self) -> Option<&anyhow::Error> {
        match self {
            TransformError::Generation { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ParseError> for TransformError {
    fn from(err: ParseError) -> Self {
        TransformError::Parse(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_errors_are_classified() {
        let err = anyhow::Error::new(ContextError::MalformedTarget { start: 4, end: 2 });
        assert!(matches!(
            TransformError::from_generator("g", err),
            TransformError::MalformedTarget { .. }
        ));

        let err = anyhow::anyhow!("boom");
        let classified = TransformError::from_generator("g", err);
        assert_eq!(classified.generator_error().unwrap().to_string(), "boom");
    }
}
