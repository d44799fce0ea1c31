use anyhow::{bail, Context};
use indexmap::IndexMap;
use serde::Deserialize;
use sourcegen::{GeneratorDescriptor, GeneratorRegistry, NameMatcher, SyntaxKind, SyntaxKinds};
use std::fs;
use std::path::{Path, PathBuf};

use crate::template::TemplateGenerator;

pub const DEFAULT_CONFIG_FILE: &str = "sourcegen.json";
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SourcegenConfig {
    #[serde(default)]
    pub include: Vec<String>,
    pub out_dir: Option<String>,
    pub max_iterations: Option<usize>,
    /// Declaration order is registry order.
    #[serde(default)]
    pub generators: IndexMap<String, GeneratorConfig>,
    /// Directory the config file lives in; relative paths resolve against it.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GeneratorConfig {
    pub annotation: AnnotationMatcher,
    pub kinds: Option<Vec<SyntaxKind>>,
    pub template: Option<String>,
    pub template_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AnnotationMatcher {
    Exact(String),
    Pattern { pattern: String },
}

impl SourcegenConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let base_dir = path.parent().unwrap_or(Path::new("")).to_path_buf();
        Self::parse(&content, base_dir)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parse config text. `templateFile` entries are read here, relative to
    /// `base_dir`, so a loaded config never touches the disk again.
    pub fn parse(content: &str, base_dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let mut config: SourcegenConfig = serde_json::from_str(content)?;
        config.base_dir = base_dir.into();

        let base_dir = config.base_dir.clone();
        for (label, generator) in config.generators.iter_mut() {
            let template_path = match (&generator.template, &generator.template_file) {
                (Some(_), Some(_)) => {
                    bail!("generator `{}` sets both `template` and `templateFile`", label)
                }
                (None, None) => bail!("generator `{}` needs `template` or `templateFile`", label),
                (Some(_), None) => None,
                (None, Some(file)) => Some(base_dir.join(file)),
            };
            if let Some(path) = template_path {
                let text = fs::read_to_string(&path).with_context(|| {
                    format!("generator `{}`: failed to read {}", label, path.display())
                })?;
                generator.template = Some(text);
            }

            if let Some(kinds) = &generator.kinds {
                if let Some(kind) = kinds.iter().find(|kind| !kind.is_annotatable()) {
                    bail!("generator `{}`: `{}` declarations cannot carry decorators", label, kind);
                }
            }
        }

        Ok(config)
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS)
    }

    pub fn out_dir(&self) -> Option<PathBuf> {
        self.out_dir.as_ref().map(|dir| self.base_dir.join(dir))
    }

    /// Build a fresh registry, one template generator per table entry.
    pub fn to_registry(&self) -> anyhow::Result<GeneratorRegistry> {
        let mut registry = GeneratorRegistry::new();
        for (label, generator) in &self.generators {
            registry.register(generator.to_descriptor(label)?);
        }
        Ok(registry)
    }

    /// Files matched by `include`, sorted and without duplicates.
    pub fn discover_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for pattern in &self.include {
            let full_pattern = self.base_dir.join(pattern);
            let pattern_str = full_pattern.to_string_lossy();
            let paths = glob::glob(&pattern_str)
                .with_context(|| format!("invalid include pattern `{}`", pattern))?;
            for entry in paths {
                let path = entry?;
                if path.is_file() {
                    files.push(path);
                }
            }
        }
        files.sort();
        files.dedup();
        Ok(files)
    }
}

impl GeneratorConfig {
    pub fn matcher(&self) -> anyhow::Result<NameMatcher> {
        match &self.annotation {
            AnnotationMatcher::Exact(name) => Ok(NameMatcher::exact(name.as_str())),
            AnnotationMatcher::Pattern { pattern } => NameMatcher::pattern(pattern)
                .with_context(|| format!("invalid annotation pattern `{}`", pattern)),
        }
    }

    fn to_descriptor(&self, label: &str) -> anyhow::Result<GeneratorDescriptor> {
        let matcher = self.matcher().with_context(|| format!("generator `{}`", label))?;
        let Some(template) = &self.template else {
            bail!("generator `{}` has no template", label);
        };

        let descriptor =
            GeneratorDescriptor::new(label, matcher, TemplateGenerator::new(template.clone()));
        Ok(match &self.kinds {
            Some(kinds) => descriptor.with_kinds(kinds.iter().copied().collect::<SyntaxKinds>()),
            None => descriptor,
        })
    }
}
