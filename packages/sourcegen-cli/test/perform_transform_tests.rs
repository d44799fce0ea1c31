//! File driver tests

use sourcegen_cli::{perform_transform, OutputMode, SourcegenConfig, TransformRequest};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CONFIG: &str = r#"{
    "include": ["src/**/*.ts"],
    "generators": {
        "getter": {
            "annotation": "Gen",
            "kinds": ["methodDeclaration"],
            "template": "get {{name}}() { return {{args}}; }"
        },
        "strip": { "annotation": "Strip", "template": "{{undecorated}}" }
    }
}"#;

fn project(config: &str, files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("sourcegen.json"), config).unwrap();
    for (path, content) in files {
        let path = dir.path().join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

fn load(dir: &Path) -> SourcegenConfig {
    SourcegenConfig::load(&dir.join("sourcegen.json")).unwrap()
}

#[test]
fn should_rewrite_included_files_in_place() {
    let dir = project(
        CONFIG,
        &[
            ("src/a.ts", "@Strip\nclass A {\n  @Gen(42) value() {}\n}\n"),
            ("src/b.ts", "class B {}\n"),
        ],
    );

    let summary = perform_transform(&load(dir.path()), &TransformRequest::default()).unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("src/a.ts")).unwrap(),
        "class A {\n  get Gen() { return 42; }\n}\n"
    );
    assert_eq!(fs::read_to_string(dir.path().join("src/b.ts")).unwrap(), "class B {}\n");
    assert_eq!(summary.files.len(), 2);
    assert_eq!(summary.rewrites(), 2);
    let changed: Vec<_> = summary.changed().map(|report| report.path.clone()).collect();
    assert_eq!(changed, vec![dir.path().join("src/a.ts")]);
    assert_eq!(summary.files[1].output, None);
}

#[test]
fn should_mirror_inputs_into_the_output_directory() {
    let config = CONFIG.replacen('{', r#"{ "outDir": "generated","#, 1);
    let dir = project(&config, &[("src/nested/a.ts", "@Strip class A {}\n")]);

    let summary = perform_transform(&load(dir.path()), &TransformRequest::default()).unwrap();

    let output = dir.path().join("generated/src/nested/a.ts");
    assert_eq!(fs::read_to_string(&output).unwrap(), "class A {}\n");
    assert_eq!(
        fs::read_to_string(dir.path().join("src/nested/a.ts")).unwrap(),
        "@Strip class A {}\n"
    );
    assert_eq!(summary.files[0].output.as_deref(), Some(output.as_path()));
}

#[test]
fn should_only_report_changes_in_check_mode() {
    let dir = project(CONFIG, &[("src/a.ts", "@Strip class A {}\n")]);
    let request = TransformRequest {
        mode: OutputMode::Check,
        ..TransformRequest::default()
    };

    let summary = perform_transform(&load(dir.path()), &request).unwrap();

    assert_eq!(summary.changed().count(), 1);
    assert_eq!(summary.files[0].output, None);
    assert_eq!(
        fs::read_to_string(dir.path().join("src/a.ts")).unwrap(),
        "@Strip class A {}\n"
    );
}

#[test]
fn should_prefer_explicit_files_over_include_patterns() {
    let dir = project(
        CONFIG,
        &[
            ("src/a.ts", "@Strip class A {}\n"),
            ("other/b.ts", "@Strip class B {}\n"),
        ],
    );
    let request = TransformRequest {
        files: vec![dir.path().join("other/b.ts")],
        mode: OutputMode::Write,
    };

    let summary = perform_transform(&load(dir.path()), &request).unwrap();

    assert_eq!(summary.files.len(), 1);
    assert_eq!(fs::read_to_string(dir.path().join("other/b.ts")).unwrap(), "class B {}\n");
    assert_eq!(
        fs::read_to_string(dir.path().join("src/a.ts")).unwrap(),
        "@Strip class A {}\n"
    );
}

#[test]
fn should_fail_with_the_file_and_generator_in_the_message() {
    let config = r#"{
        "include": ["src/*.ts"],
        "generators": { "broken": { "annotation": "Gen", "template": "{{missing}}" } }
    }"#;
    let dir = project(config, &[("src/a.ts", "@Gen class A {}\n")]);

    let err = perform_transform(&load(dir.path()), &TransformRequest::default()).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("a.ts"), "{message}");
    assert!(message.contains("broken"), "{message}");
    assert!(message.contains("unknown template placeholder `missing`"), "{message}");
}

#[test]
fn should_stop_runaway_templates_at_the_configured_limit() {
    let config = r#"{
        "include": ["src/*.ts"],
        "maxIterations": 3,
        "generators": { "echo": { "annotation": "Gen", "template": "{{target}}" } }
    }"#;
    let dir = project(config, &[("src/a.ts", "@Gen class A {}\n")]);

    let err = perform_transform(&load(dir.path()), &TransformRequest::default()).unwrap_err();
    assert!(format!("{:#}", err).contains("3 iterations"));
}
