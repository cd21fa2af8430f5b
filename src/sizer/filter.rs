use std::fmt::{Display, Formatter};

use crate::config::RepositorySpec;
use crate::github::{GithubRepoName, PullRequestNumber, WebhookEvent};

/// Pull request actions after which the code of the PR may have changed.
const RELEVANT_ACTIONS: [&str; 3] = ["opened", "synchronize", "reopened"];

/// A pull request whose size should be (re)computed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PullRequestTarget {
    pub repository: GithubRepoName,
    pub number: PullRequestNumber,
}

impl Display for PullRequestTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.repository, self.number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnsupportedEventType,
    RepositoryNotConfigured,
    ActionNotRelevant,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SkipReason::UnsupportedEventType => "unsupported event type",
            SkipReason::RepositoryNotConfigured => "repository not configured",
            SkipReason::ActionNotRelevant => "action not relevant",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    Proceed(PullRequestTarget),
    Skip(SkipReason),
}

/// Decides whether an authenticated event should trigger sizing of its pull request.
pub fn should_process(event: &WebhookEvent, repository: &RepositorySpec) -> FilterDecision {
    let WebhookEvent::PullRequest(event) = event else {
        return FilterDecision::Skip(SkipReason::UnsupportedEventType);
    };
    if !repository.matches(&event.repository) {
        return FilterDecision::Skip(SkipReason::RepositoryNotConfigured);
    }
    if !RELEVANT_ACTIONS.contains(&event.action.as_str()) {
        return FilterDecision::Skip(SkipReason::ActionNotRelevant);
    }
    FilterDecision::Proceed(PullRequestTarget {
        repository: event.repository.clone(),
        number: event.number,
    })
}

#[cfg(test)]
mod tests {
    use super::{should_process, FilterDecision, PullRequestTarget, SkipReason};
    use crate::config::RepositorySpec;
    use crate::github::{GithubRepoName, PullRequestEvent, WebhookEvent};

    fn pr_event(repo: &str, action: &str) -> WebhookEvent {
        WebhookEvent::PullRequest(PullRequestEvent {
            action: action.to_string(),
            repository: GithubRepoName::from_full_name(repo).unwrap(),
            number: 7.into(),
        })
    }

    fn spec(value: &str) -> RepositorySpec {
        value.parse().unwrap()
    }

    #[test]
    fn proceed_for_relevant_actions() {
        for action in ["opened", "synchronize", "reopened"] {
            assert_eq!(
                should_process(&pr_event("acme/widget", action), &spec("acme/widget")),
                FilterDecision::Proceed(PullRequestTarget {
                    repository: GithubRepoName::new("acme", "widget"),
                    number: 7.into(),
                })
            );
        }
    }

    #[test]
    fn skip_other_event_types() {
        assert_eq!(
            should_process(&WebhookEvent::Other("push".to_string()), &spec("acme")),
            FilterDecision::Skip(SkipReason::UnsupportedEventType)
        );
    }

    #[test]
    fn skip_irrelevant_actions() {
        for action in ["labeled", "unlabeled", "closed", "edited", "synchronized"] {
            assert_eq!(
                should_process(&pr_event("acme/widget", action), &spec("acme")),
                FilterDecision::Skip(SkipReason::ActionNotRelevant),
                "action {action}"
            );
        }
    }

    #[test]
    fn owner_spec_matches_any_repository() {
        assert!(matches!(
            should_process(&pr_event("acme/gadget", "opened"), &spec("acme")),
            FilterDecision::Proceed(_)
        ));
        assert!(matches!(
            should_process(&pr_event("ACME/Gadget", "opened"), &spec("acme")),
            FilterDecision::Proceed(_)
        ));
    }

    #[test]
    fn skip_unconfigured_repository() {
        assert_eq!(
            should_process(&pr_event("other/widget", "opened"), &spec("acme")),
            FilterDecision::Skip(SkipReason::RepositoryNotConfigured)
        );
        assert_eq!(
            should_process(&pr_event("acme/gadget", "opened"), &spec("acme/widget")),
            FilterDecision::Skip(SkipReason::RepositoryNotConfigured)
        );
    }

    #[test]
    fn repository_is_checked_before_action() {
        assert_eq!(
            should_process(&pr_event("other/widget", "labeled"), &spec("acme/widget")),
            FilterDecision::Skip(SkipReason::RepositoryNotConfigured)
        );
    }
}
