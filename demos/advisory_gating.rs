//! Advisory vs blocking gating example
//!
//! Uses plain shell commands so it runs anywhere: the advisory job always
//! fails, the blocking jobs always pass, and the run still succeeds.
//!
//! Run with: cargo run --example advisory_gating

use quality_gate::prelude::*;

const PIPELINE_YAML: &str = r#"
name: gating-demo
jobs:
  lint:
    advisory: true
    steps:
      - name: Always-complaining linter
        run: "echo 'style: 392 issues found' && false"
  test:
    matrix:
      python: ["3.11", "3.12", "3.13"]
    steps:
      - name: Matrix cell
        run: "echo cell ${{ matrix.python }} ok"
  integration:
    steps:
      - name: Version query
        run: "true"
      - name: Help query
        run: "true"
"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("quality_gate=info")
        .init();

    let executor = Executor::new();
    let result = executor.run_yaml(PIPELINE_YAML).await?;

    println!("\nOverall success: {}", result.success);
    println!("Advisory findings: {:?}", result.advisory_findings());
    println!("Gating failures: {:?}", result.gating_failures());

    for (name, job) in &result.jobs {
        println!(
            "  {} -> {:?} (gate: {:?})",
            name,
            job.state,
            job.gate_outcome()
        );
    }

    Ok(())
}
