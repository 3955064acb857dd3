//! Trigger policy — deciding when a pipeline runs
//!
//! A pipeline declares the repository events that start a run in its `on:`
//! block. Push and pull-request events fire only when they target one of the
//! configured branches; manual dispatch always fires. The decision has no
//! side effects beyond starting or not starting a run.

use serde::{Deserialize, Serialize};

/// Branch condition for push and pull-request triggers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchFilter {
    /// Branch names that fire the trigger
    #[serde(default)]
    pub branches: Vec<String>,
}

impl BranchFilter {
    pub fn matches(&self, branch: &str) -> bool {
        self.branches.iter().any(|b| b == branch)
    }
}

/// The `on:` block of a pipeline
///
/// A pipeline without an `on:` block can only be run by manual dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triggers {
    /// Fire on push events targeting the listed branches
    #[serde(default)]
    pub push: Option<BranchFilter>,

    /// Fire on pull-request events targeting the listed branches
    #[serde(default)]
    pub pull_request: Option<BranchFilter>,
}

/// A repository event that may start a pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RepoEvent {
    /// A push to a branch
    Push { branch: String },
    /// A pull request targeting a branch
    PullRequest { target: String },
    /// Manual dispatch
    Manual,
}

impl std::fmt::Display for RepoEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoEvent::Push { branch } => write!(f, "push to {}", branch),
            RepoEvent::PullRequest { target } => write!(f, "pull request against {}", target),
            RepoEvent::Manual => write!(f, "manual dispatch"),
        }
    }
}

impl Triggers {
    /// Decide whether an event starts a run.
    pub fn fires_on(&self, event: &RepoEvent) -> bool {
        match event {
            RepoEvent::Push { branch } => {
                self.push.as_ref().is_some_and(|f| f.matches(branch))
            }
            RepoEvent::PullRequest { target } => {
                self.pull_request.as_ref().is_some_and(|f| f.matches(target))
            }
            RepoEvent::Manual => true,
        }
    }
}
