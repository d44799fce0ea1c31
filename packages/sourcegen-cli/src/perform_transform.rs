//! Perform Transform
//!
//! Runs the transform over every selected file and decides where the
//! results go.

use anyhow::Context;
use sourcegen::{TransformOptions, Transformer, TypeScriptParser};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::SourcegenConfig;

/// What happens to transformed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Write to `outDir`, or over the input when no `outDir` is set.
    #[default]
    Write,
    /// Print every result to stdout.
    Stdout,
    /// Write nothing; only report which files would change.
    Check,
}

#[derive(Debug, Clone, Default)]
pub struct TransformRequest {
    /// Explicit inputs. When empty, the config's `include` patterns decide.
    pub files: Vec<PathBuf>,
    pub mode: OutputMode,
}

/// Outcome for one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    /// Where the result was written, if anywhere.
    pub output: Option<PathBuf>,
    pub rewrites: usize,
    pub changed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TransformSummary {
    pub files: Vec<FileReport>,
}

impl TransformSummary {
    pub fn changed(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|report| report.changed)
    }

    pub fn rewrites(&self) -> usize {
        self.files.iter().map(|report| report.rewrites).sum()
    }
}

/// Transform the requested files with the generators of `config`.
///
/// Stops at the first failing file. Files handled before it keep whatever
/// was already written for them.
pub fn perform_transform(
    config: &SourcegenConfig,
    request: &TransformRequest,
) -> anyhow::Result<TransformSummary> {
    let files = if request.files.is_empty() {
        config.discover_files()?
    } else {
        request.files.clone()
    };
    info!(files = files.len(), generators = config.generators.len(), "transforming");

    let options = TransformOptions::default().with_max_iterations(config.max_iterations());
    let out_dir = config.out_dir();
    let mut summary = TransformSummary::default();

    for path in files {
        let source = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let parser = TypeScriptParser::for_path(&path).unwrap_or_default();
        let transformer = Transformer::new(parser, config.to_registry()?).with_options(options.clone());
        let result = transformer
            .transform_source_blocking(&source)
            .with_context(|| format!("failed to transform {}", path.display()))?;

        let changed = result.source() != source;
        debug!(path = %path.display(), rewrites = result.iterations(), changed);

        let output = match request.mode {
            OutputMode::Check => None,
            OutputMode::Stdout => {
                print!("{}", result.source());
                None
            }
            OutputMode::Write => match &out_dir {
                Some(dir) => {
                    let target = output_path(dir, &config.base_dir, &path);
                    write_file(&target, result.source())?;
                    Some(target)
                }
                None if changed => {
                    write_file(&path, result.source())?;
                    Some(path.clone())
                }
                None => None,
            },
        };

        summary.files.push(FileReport {
            path,
            output,
            rewrites: result.iterations(),
            changed,
        });
    }

    Ok(summary)
}

/// `out_dir` plus the input path relative to `base_dir`. Inputs outside
/// `base_dir` keep only their file name.
pub fn output_path(out_dir: &Path, base_dir: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(base_dir) {
        Ok(relative) => out_dir.join(relative),
        Err(_) => out_dir.join(path.file_name().unwrap_or(path.as_os_str())),
    }
}

fn write_file(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_mirrors_relative_layout() {
        assert_eq!(
            output_path(Path::new("out"), Path::new("proj"), Path::new("proj/src/a.ts")),
            PathBuf::from("out/src/a.ts")
        );
        assert_eq!(
            output_path(Path::new("out"), Path::new(""), Path::new("src/a.ts")),
            PathBuf::from("out/src/a.ts")
        );
        assert_eq!(
            output_path(Path::new("out"), Path::new("proj"), Path::new("/elsewhere/b.ts")),
            PathBuf::from("out/b.ts")
        );
    }
}
