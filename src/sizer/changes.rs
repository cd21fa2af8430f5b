use crate::github::{GithubRepoName, PullRequestNumber, UpstreamCall, UpstreamError};
use crate::sizer::RepositoryClient;

/// GitHub returns at most 100 entries per page of the changed files listing.
pub const FILES_PER_PAGE: u8 = 100;

/// Sums the changed lines of all files of a pull request, walking every page of the listing.
///
/// Either the full count is returned, or the first error encountered.
pub async fn aggregate<C: RepositoryClient + ?Sized>(
    client: &C,
    repo: &GithubRepoName,
    pr: PullRequestNumber,
) -> Result<u64, UpstreamError> {
    let mut total: u64 = 0;
    let mut page = 1;
    loop {
        let listing = client.list_changed_files(repo, pr, page).await?;
        total = listing
            .changes
            .iter()
            .fold(total, |total, changes| total.saturating_add(*changes));
        tracing::debug!(
            "Page {page} of {repo}#{pr} lists {} file(s), {total} changed line(s) so far",
            listing.changes.len()
        );

        match listing.next_page {
            None => break,
            Some(next) if next > page => page = next,
            Some(next) => {
                return Err(UpstreamError::InvalidResponse {
                    repository: repo.clone(),
                    pr,
                    call: UpstreamCall::ListFiles { page },
                    reason: format!("next page {next} does not follow page {page}"),
                });
            }
        }
    }
    Ok(total)
}
