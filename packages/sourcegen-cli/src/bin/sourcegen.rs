/**
 * Sourcegen CLI - sourcegen
 *
 * Rewrites decorated TypeScript declarations with the generators
 * configured in sourcegen.json
 */
use clap::{value_parser, Arg, ArgAction, Command};
use sourcegen_cli::{perform_transform, OutputMode, SourcegenConfig, TransformRequest, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = Command::new("sourcegen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Decorator-driven source rewriting")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .default_value(DEFAULT_CONFIG_FILE)
                .value_parser(value_parser!(PathBuf))
                .help("Path to sourcegen.json"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Log more (-v info, -vv debug); RUST_LOG takes precedence"),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .action(ArgAction::SetTrue)
                .conflicts_with("stdout")
                .help("Write nothing and exit with status 1 if any file would change"),
        )
        .arg(
            Arg::new("stdout")
                .long("stdout")
                .action(ArgAction::SetTrue)
                .help("Print results instead of writing them"),
        )
        .arg(
            Arg::new("files")
                .value_name("FILES")
                .num_args(0..)
                .value_parser(value_parser!(PathBuf))
                .help("Files to transform instead of the configured include patterns"),
        )
        .get_matches();

    init_logging(matches.get_count("verbose"));

    let config_path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mode = if matches.get_flag("check") {
        OutputMode::Check
    } else if matches.get_flag("stdout") {
        OutputMode::Stdout
    } else {
        OutputMode::Write
    };
    let request = TransformRequest {
        files: matches
            .get_many::<PathBuf>("files")
            .map(|files| files.cloned().collect())
            .unwrap_or_default(),
        mode,
    };

    let result = SourcegenConfig::load(&config_path)
        .and_then(|config| perform_transform(&config, &request));

    let summary = match result {
        Ok(summary) => summary,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            process::exit(1);
        }
    };

    for report in &summary.files {
        let status = match (&report.output, report.changed) {
            (Some(output), _) => format!("wrote {}", output.display()),
            (None, true) if mode == OutputMode::Check => "would change".to_string(),
            (None, true) => "changed".to_string(),
            (None, false) => "unchanged".to_string(),
        };
        eprintln!("{}: {} rewrites, {}", report.path.display(), report.rewrites, status);
    }

    if mode == OutputMode::Check && summary.changed().next().is_some() {
        process::exit(1);
    }
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
