//! Text templates as generators.
//!
//! A template is plain text with `{{placeholder}}` slots filled from the
//! generation context:
//!
//! | placeholder     | value                                              |
//! |-----------------|----------------------------------------------------|
//! | `target`        | declaration text, decorators included              |
//! | `undecorated`   | declaration text without the matched decorator     |
//! | `annotation`    | matched decorator text, `@` included               |
//! | `name`          | decorator name                                     |
//! | `args`          | arguments joined by `,`, empty for `@Name`         |
//! | `kind`          | declaration kind, e.g. `methodDeclaration`         |

use anyhow::bail;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use sourcegen::{GenerationContext, Generator};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z_]\w*)\s*\}\}").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateGenerator {
    template: String,
}

impl TemplateGenerator {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn render(&self, ctx: &GenerationContext<'_>) -> anyhow::Result<String> {
        let mut output = String::with_capacity(self.template.len());
        let mut last = 0;
        for captures in PLACEHOLDER.captures_iter(&self.template) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            output.push_str(&self.template[last..whole.start()]);
            match name.as_str() {
                "target" => output.push_str(ctx.rendered_target()?),
                "undecorated" => output.push_str(&ctx.undecorated_target()?),
                "annotation" => output.push_str(ctx.rendered_annotation()?),
                "name" => output.push_str(&ctx.annotation().name),
                "args" => output.push_str(ctx.rendered_arguments()?.unwrap_or("")),
                "kind" => output.push_str(ctx.target().kind.as_str()),
                other => bail!("unknown template placeholder `{}`", other),
            }
            last = whole.end();
        }
        output.push_str(&self.template[last..]);
        Ok(output)
    }
}

#[async_trait(?Send)]
impl Generator for TemplateGenerator {
    async fn generate(&self, ctx: &GenerationContext<'_>) -> anyhow::Result<String> {
        self.render(ctx)
    }
}
