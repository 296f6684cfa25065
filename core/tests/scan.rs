use archdoc_core::{AppError, IgnoreRuleSet, ScanConfig, scan_source_tree, walk};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (rel, content) in files {
        write(dir.path(), rel, content);
    }
    dir
}

fn marker_count(text: &str) -> usize {
    text.matches("--- FILE: ").count()
}

#[test]
fn end_to_end_scenario() {
    let dir = project(&[
        ("main.go", "package main\n"),
        (".git/config", "[core]\n"),
        ("README.md", "# Demo\n"),
        ("secrets.env", "TOKEN=abc\n"),
        (".gitignore", "*.log\n"),
        ("debug.log", "boom\n"),
    ]);

    let output = scan_source_tree(dir.path(), &ScanConfig::default()).unwrap();

    assert_eq!(output.files, vec!["README.md", "main.go"]);
    assert_eq!(
        output.text,
        "\n--- FILE: README.md ---\n# Demo\n\n\n--- FILE: main.go ---\npackage main\n\n"
    );
    assert_eq!(marker_count(&output.text), 2);
    assert_eq!(output.ignore_rule_count, 1);
}

#[test]
fn negation_reincludes_specific_file() {
    let dir = project(&[
        (".gitignore", "excluded/*\n!excluded/keep.go\n"),
        ("excluded/keep.go", "keep"),
        ("excluded/drop.go", "drop"),
    ]);
    let output = scan_source_tree(dir.path(), &ScanConfig::default()).unwrap();
    assert_eq!(output.files, vec!["excluded/keep.go"]);
}

#[test]
fn dir_only_rule_prunes_subtree_despite_later_negation() {
    let dir = project(&[
        (".gitignore", "build/\n!unrelated.go\n"),
        ("build/output.go", "generated"),
        ("unrelated.go", "ok"),
    ]);
    let output = scan_source_tree(dir.path(), &ScanConfig::default()).unwrap();
    assert_eq!(output.files, vec!["unrelated.go"]);
    assert!(!output.text.contains("--- FILE: build"));
}

#[test]
fn hardcoded_dirs_win_over_everything() {
    let dir = project(&[
        (".gitignore", "!node_modules/\n!node_modules/**\n"),
        ("node_modules/pkg/index.js", "x"),
        ("src/node_modules/inner.ts", "x"),
        ("vendor/dep.go", "x"),
        ("docs/guide.md", "x"),
        ("app.js", "x"),
    ]);
    let output = scan_source_tree(dir.path(), &ScanConfig::default()).unwrap();
    assert_eq!(output.files, vec!["app.js"]);
}

#[test]
fn inclusion_requires_whitelist_and_no_exclusion() {
    let dir = project(&[
        (".gitignore", "*.yaml\n!deploy/*.yaml\n"),
        ("ci.yaml", "x"),
        ("deploy/app.yaml", "x"),
        ("deploy/app.json", "x"),
        ("infra/main.tf", "x"),
        ("tools/gen.py", "x"),
    ]);
    let output = scan_source_tree(dir.path(), &ScanConfig::default()).unwrap();
    assert_eq!(
        output.files,
        vec!["deploy/app.yaml", "infra/main.tf", "tools/gen.py"]
    );
}

#[test]
fn missing_gitignore_equals_empty_rule_set() {
    let files = [("a.go", "a"), ("b/c.py", "c"), ("d.log", "d")];
    let without = project(&files);
    let with_empty = project(&files);
    write(with_empty.path(), ".gitignore", "");

    let a = scan_source_tree(without.path(), &ScanConfig::default()).unwrap();
    let b = scan_source_tree(with_empty.path(), &ScanConfig::default()).unwrap();
    assert_eq!(a.text, b.text);
    assert_eq!(a.files, vec!["a.go", "b/c.py"]);
}

#[test]
fn gitignore_can_be_disabled() {
    let dir = project(&[(".gitignore", "*.go\n"), ("main.go", "x")]);
    let config = ScanConfig {
        use_gitignore: false,
        ..ScanConfig::default()
    };
    let output = scan_source_tree(dir.path(), &config).unwrap();
    assert_eq!(output.files, vec!["main.go"]);
    assert_eq!(output.ignore_rule_count, 0);
}

#[test]
fn repeated_scans_are_byte_identical() {
    let dir = project(&[
        ("z.go", "z"),
        ("a/b.py", "b"),
        ("a/a.ts", "a"),
        ("m.md", "m"),
        ("k8s/deploy.yaml", "d"),
    ]);
    let first = scan_source_tree(dir.path(), &ScanConfig::default()).unwrap();
    let second = scan_source_tree(dir.path(), &ScanConfig::default()).unwrap();
    assert_eq!(first.text, second.text);
    assert_eq!(first.files, vec!["a/a.ts", "a/b.py", "k8s/deploy.yaml", "m.md", "z.go"]);
}

#[test]
fn block_count_matches_walker_records() {
    let dir = project(&[
        ("one.go", "1"),
        ("two/three.js", "3"),
        ("two/four.txt", "4"),
        ("five.tf", "5"),
    ]);
    let config = ScanConfig::default();
    let rules = IgnoreRuleSet::load(dir.path());
    let records = walk(dir.path(), &config, &rules).unwrap().count();
    let output = scan_source_tree(dir.path(), &config).unwrap();
    assert_eq!(records, 3);
    assert_eq!(marker_count(&output.text), records);
}

#[test]
fn no_path_appears_twice() {
    let dir = project(&[
        (".gitignore", "*.go\n!*.go\n!main.go\n"),
        ("main.go", "x"),
        ("pkg/util.go", "y"),
    ]);
    let output = scan_source_tree(dir.path(), &ScanConfig::default()).unwrap();
    let mut deduped = output.files.clone();
    deduped.dedup();
    assert_eq!(deduped, output.files);
    assert_eq!(output.files, vec!["main.go", "pkg/util.go"]);
}

#[test]
fn invalid_root_produces_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let err = scan_source_tree(&dir.path().join("missing"), &ScanConfig::default()).unwrap_err();
    assert!(matches!(err, AppError::RootAccess { .. }));
    assert!(err.to_string().contains("missing"));
}
