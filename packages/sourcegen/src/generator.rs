//! The generator seam.

use async_trait::async_trait;

use crate::context::GenerationContext;

/// Produces the replacement text for a matched declaration.
///
/// Generation may suspend; the driver awaits one generation at a time, so
/// the returned future does not need to be `Send`.
#[async_trait(?Send)]
pub trait Generator {
    async fn generate(&self, ctx: &GenerationContext<'_>) -> anyhow::Result<String>;
}

/// Adapter turning a synchronous closure into a [`Generator`].
pub struct FnGenerator<F> {
    f: F,
}

/// Wrap a synchronous closure as a [`Generator`].
pub fn from_fn<F>(f: F) -> FnGenerator<F>
where
    F: Fn(&GenerationContext<'_>) -> anyhow::Result<String>,
{
    FnGenerator { f }
}

#[async_trait(?Send)]
impl<F> Generator for FnGenerator<F>
where
    F: Fn(&GenerationContext<'_>) -> anyhow::Result<String>,
{
    async fn generate(&self, ctx: &GenerationContext<'_>) -> anyhow::Result<String> {
        (self.f)(ctx)
    }
}
