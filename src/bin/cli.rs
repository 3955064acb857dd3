use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use quality_gate::prelude::*;
use quality_gate::RepoEvent;
use tracing_subscriber::EnvFilter;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "quality-gate")]
#[command(about = "Run declarative CI quality pipelines", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EventKind {
    /// A push to a branch
    Push,
    /// A pull request targeting a branch
    PullRequest,
    /// Manual dispatch (always triggers)
    Manual,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a pipeline manifest for a repository event
    Run {
        /// Path to the pipeline YAML file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Repository event kind
        #[arg(long, value_enum, default_value = "manual")]
        event: EventKind,

        /// Branch the event targets (push and pull-request events)
        #[arg(long)]
        branch: Option<String>,

        /// Maximum number of concurrently executing cells
        #[arg(short, long, default_value_t = 4)]
        parallel: usize,

        /// Extra environment variables (KEY=VALUE, repeatable)
        #[arg(short, long, value_name = "KEY=VALUE")]
        env: Vec<String>,

        /// Output format for the run record
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// List pipelines and their jobs
    List {
        /// Path to a pipeline file or directory
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Validate pipeline manifests without running them
    Validate {
        /// Path to a pipeline file or directory
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

#[cfg(feature = "otel")]
fn init_otel_tracing(verbose: bool) {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::runtime::Tokio;
    use opentelemetry_sdk::trace::TracerProvider;

    let filter = if verbose {
        "quality_gate=debug"
    } else {
        "quality_gate=info"
    };

    let otlp_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&otlp_endpoint)
        .build()
        .expect("Failed to create OTLP exporter");

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, Tokio)
        .build();

    let tracer = provider.tracer("quality-gate");
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .with(otel_layer)
        .init();

    opentelemetry::global::set_tracer_provider(provider);
}

#[cfg(not(feature = "otel"))]
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "quality_gate=debug"
    } else {
        "quality_gate=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    #[cfg(feature = "otel")]
    init_otel_tracing(cli.verbose);

    #[cfg(not(feature = "otel"))]
    init_tracing(cli.verbose);

    let result = run(cli).await;

    #[cfg(feature = "otel")]
    opentelemetry::global::shutdown_tracer_provider();

    match result {
        Ok(success) => {
            if success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "quality-gate failed");
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    match cli.command {
        Commands::Run {
            file,
            event,
            branch,
            parallel,
            env,
            format,
        } => run_pipeline(file, event, branch, parallel, env, format).await,
        Commands::List { path } => list_pipelines(path),
        Commands::Validate { path } => validate(path),
    }
}

fn build_event(kind: EventKind, branch: Option<String>) -> anyhow::Result<RepoEvent> {
    match kind {
        EventKind::Manual => Ok(RepoEvent::Manual),
        EventKind::Push => {
            let branch =
                branch.ok_or_else(|| anyhow::anyhow!("--branch is required for push events"))?;
            Ok(RepoEvent::Push { branch })
        }
        EventKind::PullRequest => {
            let target = branch.ok_or_else(|| {
                anyhow::anyhow!("--branch is required for pull-request events")
            })?;
            Ok(RepoEvent::PullRequest { target })
        }
    }
}

async fn run_pipeline(
    file: PathBuf,
    event: EventKind,
    branch: Option<String>,
    parallel: usize,
    env: Vec<String>,
    format: Format,
) -> anyhow::Result<bool> {
    if !file.exists() {
        anyhow::bail!("Pipeline file not found: {}", file.display());
    }

    let pipeline = PipelineLoader::load_file(&file)?;
    let event = build_event(event, branch)?;

    let mut executor = Executor::new().parallel(parallel);
    for pair in &env {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Invalid --env value (expected KEY=VALUE): {}", pair))?;
        executor.set_env(key, value);
    }

    let result = match executor.run_for_event(&pipeline, &event).await? {
        Some(result) => result,
        None => {
            println!(
                "Skipped: {} does not trigger pipeline '{}'",
                event, pipeline.name
            );
            return Ok(true);
        }
    };

    match format {
        Format::Text => print_pipeline_result(&result),
        Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(result.success)
}

fn load_path(path: &PathBuf) -> anyhow::Result<Vec<Pipeline>> {
    if !path.exists() {
        anyhow::bail!("Path not found: {}", path.display());
    }

    if path.is_dir() {
        Ok(PipelineLoader::load_directory(path)?)
    } else {
        Ok(vec![PipelineLoader::load_file(path)?])
    }
}

fn list_pipelines(path: PathBuf) -> anyhow::Result<bool> {
    let pipelines = load_path(&path)?;

    if pipelines.is_empty() {
        println!("No pipelines found in: {}", path.display());
        return Ok(true);
    }

    for pipeline in &pipelines {
        println!("{}", pipeline.name);
        println!("  triggers: {}", describe_triggers(&pipeline.on));

        for name in pipeline.job_names() {
            let job = &pipeline.jobs[name];
            let gating = if job.advisory { "advisory" } else { "blocking" };
            let cells = job.matrix.cells().len();
            if cells > 1 {
                println!("  {} ({}, {} matrix cells)", name, gating, cells);
            } else {
                println!("  {} ({})", name, gating);
            }
        }
        println!();
    }

    Ok(true)
}

fn describe_triggers(triggers: &Triggers) -> String {
    let mut parts = Vec::new();
    if let Some(push) = &triggers.push {
        parts.push(format!("push [{}]", push.branches.join(", ")));
    }
    if let Some(pr) = &triggers.pull_request {
        parts.push(format!("pull_request [{}]", pr.branches.join(", ")));
    }
    parts.push("manual".to_string());
    parts.join(", ")
}

fn validate(path: PathBuf) -> anyhow::Result<bool> {
    let pipelines = load_path(&path)?;

    if pipelines.is_empty() {
        println!("No pipelines found in: {}", path.display());
        return Ok(true);
    }

    let mut missing_tools = Vec::new();

    for pipeline in &pipelines {
        pipeline.validate()?;

        for (job_name, job) in &pipeline.jobs {
            for step in &job.steps {
                if let Some(program) = step_program(&step.run) {
                    if which::which(program).is_err() {
                        missing_tools.push(format!("{} (job '{}')", program, job_name));
                    }
                }
            }
        }
    }

    println!("✓ {} pipelines validated", pipelines.len());

    missing_tools.sort();
    missing_tools.dedup();
    for tool in &missing_tools {
        println!("  ! not on PATH: {}", tool);
    }

    Ok(true)
}

/// Extract the program name from a shell command, skipping compound
/// commands and expression placeholders we cannot resolve statically.
fn step_program(command: &str) -> Option<&str> {
    if command.contains("${{")
        || command.contains("&&")
        || command.contains("||")
        || command.contains('|')
        || command.contains(';')
        || command.contains('$')
    {
        return None;
    }
    command.split_whitespace().next()
}

fn print_pipeline_result(result: &PipelineResult) {
    println!("\n=== Pipeline Result ===\n");
    println!("Pipeline: {}", result.pipeline);
    println!("Event: {}", result.event);
    println!("Success: {}", if result.success { "YES" } else { "NO" });
    println!("Run ID: {}\n", result.run_id);

    let mut job_names: Vec<_> = result.jobs.keys().collect();
    job_names.sort();

    for job_name in job_names {
        let job = &result.jobs[job_name];
        let status = if job.success() { "✓" } else { "✗" };
        let tag = match job.gate_outcome() {
            GateOutcome::Advisory => " (advisory, non-gating)",
            _ if job.advisory => " (advisory)",
            _ => "",
        };
        println!("{} Job: {}{}", status, job_name, tag);

        for cell in &job.cells {
            let cell_status = if cell.success { "✓" } else { "✗" };
            println!("  {} {} ({} ms)", cell_status, cell.label, cell.duration_ms);

            for step in &cell.steps {
                if !step.success {
                    if let Some(err) = &step.error {
                        println!("      ✗ {}: {}", step.name, err);
                    } else {
                        println!("      ✗ {} (exit {})", step.name, step.exit_code);
                        if !step.stderr.is_empty() {
                            println!("        {}", step.stderr);
                        }
                    }
                }
            }
        }
    }

    let advisory = result.advisory_findings();
    if !advisory.is_empty() {
        println!("\nAdvisory findings: {}", advisory.join(", "));
    }
}
