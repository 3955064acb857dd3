use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

pub fn write_pipeline(dir: &Path, filename: &str, content: &str) {
    fs::write(dir.join(filename), content).expect("Failed to write pipeline file");
}

pub fn passing_pipeline(name: &str) -> String {
    format!(
        r#"
name: {}
jobs:
  check:
    steps:
      - run: "true"
"#,
        name
    )
}

pub fn failing_pipeline(name: &str) -> String {
    format!(
        r#"
name: {}
jobs:
  check:
    steps:
      - name: Intentional failure
        run: "false"
"#,
        name
    )
}

pub fn advisory_failing_pipeline(name: &str) -> String {
    format!(
        r#"
name: {}
jobs:
  lint:
    advisory: true
    steps:
      - name: Noisy linter
        run: "false"
  verify:
    steps:
      - run: "true"
"#,
        name
    )
}

pub fn triggered_pipeline(name: &str, branches: &[&str]) -> String {
    let branch_list = branches.join(", ");
    format!(
        r#"
name: {}
on:
  push:
    branches: [{}]
jobs:
  check:
    steps:
      - run: "true"
"#,
        name, branch_list
    )
}
