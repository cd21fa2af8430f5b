use axum::async_trait;
use http::StatusCode;
use octocrab::{Octocrab, Page};
use url::Url;

use crate::github::{GithubRepoName, PullRequestNumber, UpstreamCall, UpstreamError};
use crate::sizer::{ChangedFilesPage, LabelRemoval, RepositoryClient, FILES_PER_PAGE};

/// Provides access to pull requests of repositories using the GitHub API.
pub struct GithubRepositoryClient {
    client: Octocrab,
}

impl GithubRepositoryClient {
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }
}

#[derive(serde::Deserialize, Debug)]
struct ChangedFile {
    changes: u64,
}

#[derive(serde::Serialize)]
struct ListFilesParams {
    per_page: u8,
    page: u32,
}

#[async_trait]
impl RepositoryClient for GithubRepositoryClient {
    /// Documentation: https://docs.github.com/en/rest/pulls/pulls?apiVersion=2022-11-28#list-pull-requests-files
    async fn list_changed_files(
        &self,
        repo: &GithubRepoName,
        pr: PullRequestNumber,
        page: u32,
    ) -> Result<ChangedFilesPage, UpstreamError> {
        let call = UpstreamCall::ListFiles { page };
        let route = format!("/repos/{}/{}/pulls/{pr}/files", repo.owner(), repo.name());
        let params = ListFilesParams {
            per_page: FILES_PER_PAGE,
            page,
        };

        let files: Page<ChangedFile> = self
            .client
            .get(route, Some(&params))
            .await
            .map_err(|source| UpstreamError::Request {
                repository: repo.clone(),
                pr,
                call: call.clone(),
                source,
            })?;

        let next_page = match files.next {
            Some(ref next) => Some(page_number(&next.to_string()).ok_or_else(|| {
                UpstreamError::InvalidResponse {
                    repository: repo.clone(),
                    pr,
                    call: call.clone(),
                    reason: format!("cannot find page number in next page link {next}"),
                }
            })?),
            None => None,
        };

        Ok(ChangedFilesPage {
            changes: files.items.into_iter().map(|file| file.changes).collect(),
            next_page,
        })
    }

    /// Documentation: https://docs.github.com/en/rest/issues/labels?apiVersion=2022-11-28#remove-a-label-from-an-issue
    async fn remove_label(
        &self,
        repo: &GithubRepoName,
        pr: PullRequestNumber,
        label: &str,
    ) -> Result<LabelRemoval, UpstreamError> {
        let call = UpstreamCall::RemoveLabel {
            label: label.to_string(),
        };
        let route = format!(
            "/repos/{}/{}/issues/{pr}/labels/{}",
            repo.owner(),
            repo.name(),
            urlencoding::encode(label)
        );

        let response = self
            .client
            ._delete(route, None::<&()>)
            .await
            .map_err(|source| UpstreamError::Request {
                repository: repo.clone(),
                pr,
                call: call.clone(),
                source,
            })?;

        match response.status() {
            status if status.is_success() => Ok(LabelRemoval::Removed),
            // This is returned if we try to remove a label that is not applied to the PR.
            StatusCode::NOT_FOUND => Ok(LabelRemoval::NotPresent),
            status => Err(UpstreamError::Status {
                repository: repo.clone(),
                pr,
                call,
                status,
                text: self.client.body_to_string(response).await.unwrap_or_default(),
            }),
        }
    }

    /// Documentation: https://docs.github.com/en/rest/issues/labels?apiVersion=2022-11-28#add-labels-to-an-issue
    async fn add_labels(
        &self,
        repo: &GithubRepoName,
        pr: PullRequestNumber,
        labels: &[String],
    ) -> Result<(), UpstreamError> {
        if labels.is_empty() {
            return Ok(());
        }

        let call = UpstreamCall::AddLabels {
            labels: labels.to_vec(),
        };
        let route = format!(
            "/repos/{}/{}/issues/{pr}/labels",
            repo.owner(),
            repo.name()
        );

        // Labels that do not exist yet are created by GitHub, which requires the token to have
        // write access to the repository.
        let response = self
            .client
            ._post(route, Some(&serde_json::json!({ "labels": labels })))
            .await
            .map_err(|source| UpstreamError::Request {
                repository: repo.clone(),
                pr,
                call: call.clone(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(UpstreamError::Status {
                repository: repo.clone(),
                pr,
                call,
                status,
                text: self.client.body_to_string(response).await.unwrap_or_default(),
            })
        }
    }
}

/// Extracts the `page` query parameter of a pagination link.
fn page_number(link: &str) -> Option<u32> {
    let url = Url::parse(link).ok()?;
    let page = url
        .query_pairs()
        .find_map(|(key, value)| (key == "page").then_some(value))?;
    page.parse().ok()
}
