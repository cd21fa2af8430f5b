use crate::github::{GithubRepoName, PullRequestNumber, UpstreamError};
use crate::sizer::{LabelRemoval, RepositoryClient, SizeTable};

/// Removes every size label of `sizes` from the pull request and then applies `label`.
///
/// Labels that are not present on the PR are skipped silently. Any other failure aborts the
/// reconciliation before a new label is added. When `label` is `None`, only the removal is
/// performed.
pub async fn reconcile<C: RepositoryClient + ?Sized>(
    client: &C,
    repo: &GithubRepoName,
    pr: PullRequestNumber,
    sizes: &SizeTable,
    label: Option<&str>,
) -> Result<Option<String>, UpstreamError> {
    for stale in sizes.labels() {
        match client.remove_label(repo, pr, stale).await? {
            LabelRemoval::Removed => tracing::info!("Removed label {stale} from {repo}#{pr}"),
            LabelRemoval::NotPresent => {
                tracing::trace!("Label {stale} was not present on {repo}#{pr}")
            }
        }
    }

    let Some(label) = label else {
        tracing::warn!("No size label applies to {repo}#{pr}, leaving it unlabeled");
        return Ok(None);
    };

    tracing::info!("Adding label {label} to {repo}#{pr}");
    client.add_labels(repo, pr, &[label.to_string()]).await?;
    Ok(Some(label.to_string()))
}
