//! Quality pipeline example
//!
//! Runs the transform-myd-minimal quality pipeline for a push event.
//! The advisory/blocking split and the Python version matrix come straight
//! from the manifest; the external tools must be on PATH for the blocking
//! jobs to pass.
//!
//! Run with: cargo run --example quality_pipeline

use quality_gate::prelude::*;

const PIPELINE_YAML: &str = include_str!("ci.yaml");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("quality_gate=debug")
        .init();

    let pipeline: Pipeline = serde_yaml::from_str(PIPELINE_YAML)?;
    let event = RepoEvent::Push {
        branch: "main".to_string(),
    };

    let executor = Executor::new().parallel(4);

    println!("Dispatching {} for {}...", pipeline.name, event);
    let result = match executor.run_for_event(&pipeline, &event).await? {
        Some(result) => result,
        None => {
            println!("Event does not trigger this pipeline.");
            return Ok(());
        }
    };

    println!("\n=== Run {} ===", result.run_id);
    println!("Success: {}\n", result.success);

    for (job_name, job) in &result.jobs {
        let tag = if job.advisory { " (advisory)" } else { "" };
        println!("Job: {}{} - {:?}", job_name, tag, job.state);

        for cell in &job.cells {
            let status = if cell.success { "✓" } else { "✗" };
            println!("  [{}] {} ({} ms)", status, cell.label, cell.duration_ms);
        }
    }

    if !result.advisory_findings().is_empty() {
        println!(
            "\nAdvisory findings (non-gating): {}",
            result.advisory_findings().join(", ")
        );
    }

    Ok(())
}
