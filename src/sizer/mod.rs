use axum::async_trait;

use crate::github::{GithubRepoName, PullRequestNumber, UpstreamError};

mod changes;
mod context;
mod filter;
mod labels;
mod locks;
mod process;
mod size;

pub use changes::{aggregate, FILES_PER_PAGE};
pub use context::SizerContext;
pub use filter::{should_process, FilterDecision, PullRequestTarget, SkipReason};
pub use labels::reconcile;
pub use locks::{PullRequestGuard, PullRequestLocks};
pub use process::{deliver, DeliveryOutcome};
pub use size::{SizeRange, SizeTable, SizeTableError};

/// Provides the GitHub operations needed to size a pull request.
/// It is behind a trait to allow easier mocking in tests.
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// Fetch one page (1-based) of the files changed by the given pull request.
    async fn list_changed_files(
        &self,
        repo: &GithubRepoName,
        pr: PullRequestNumber,
        page: u32,
    ) -> Result<ChangedFilesPage, UpstreamError>;

    /// Remove a single label from the pull request.
    async fn remove_label(
        &self,
        repo: &GithubRepoName,
        pr: PullRequestNumber,
        label: &str,
    ) -> Result<LabelRemoval, UpstreamError>;

    /// Add a set of labels to the pull request, creating them in the repository if needed.
    async fn add_labels(
        &self,
        repo: &GithubRepoName,
        pr: PullRequestNumber,
        labels: &[String],
    ) -> Result<(), UpstreamError>;
}

/// A single page of the changed files listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFilesPage {
    /// Changed line count (additions + deletions) of each file on this page.
    pub changes: Vec<u64>,
    /// The page signalled as next by GitHub, if any.
    pub next_page: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRemoval {
    /// The label was applied and has been removed.
    Removed,
    /// The label was not applied to the pull request.
    NotPresent,
}
