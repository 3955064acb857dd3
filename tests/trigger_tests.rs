//! Trigger policy through the executor: which events create a run.

use quality_gate::prelude::*;
use quality_gate::Pipeline;

fn pipeline() -> Pipeline {
    serde_yaml::from_str(
        r#"
name: quality
on:
  push:
    branches: [main, develop]
  pull_request:
    branches: [main]
jobs:
  check:
    steps:
      - run: "true"
"#,
    )
    .unwrap()
}

#[tokio::test]
async fn test_push_to_configured_branch_creates_a_run() {
    let result = Executor::new()
        .run_for_event(
            &pipeline(),
            &RepoEvent::Push {
                branch: "main".to_string(),
            },
        )
        .await
        .unwrap();

    assert!(result.unwrap().success);
}

#[tokio::test]
async fn test_push_to_unconfigured_branch_creates_no_run() {
    let result = Executor::new()
        .run_for_event(
            &pipeline(),
            &RepoEvent::Push {
                branch: "feature/new-parser".to_string(),
            },
        )
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_pull_request_respects_target_branch_filter() {
    let executor = Executor::new();

    let hit = executor
        .run_for_event(
            &pipeline(),
            &RepoEvent::PullRequest {
                target: "main".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(hit.is_some());

    let miss = executor
        .run_for_event(
            &pipeline(),
            &RepoEvent::PullRequest {
                target: "develop".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(miss.is_none());
}

#[tokio::test]
async fn test_manual_dispatch_always_creates_a_run() {
    let result = Executor::new()
        .run_for_event(&pipeline(), &RepoEvent::Manual)
        .await
        .unwrap();

    assert!(result.is_some());
}

#[tokio::test]
async fn test_pipeline_without_on_block_only_runs_manually() {
    let pipeline: Pipeline = serde_yaml::from_str(
        r#"
name: adhoc
jobs:
  check:
    steps:
      - run: "true"
"#,
    )
    .unwrap();

    let executor = Executor::new();

    let push = executor
        .run_for_event(
            &pipeline,
            &RepoEvent::Push {
                branch: "main".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(push.is_none());

    let manual = executor
        .run_for_event(&pipeline, &RepoEvent::Manual)
        .await
        .unwrap();
    assert!(manual.is_some());
}

#[tokio::test]
async fn test_run_records_the_triggering_event() {
    let event = RepoEvent::Push {
        branch: "develop".to_string(),
    };
    let result = Executor::new()
        .run_for_event(&pipeline(), &event)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(result.event, event);
}
