use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OwnedMutexGuard;

use crate::sizer::PullRequestTarget;

type PullRequestMutex = Arc<tokio::sync::Mutex<()>>;

/// Serializes the processing of deliveries that target the same pull request.
///
/// Entries only live while some delivery holds or waits for them.
#[derive(Default)]
pub struct PullRequestLocks {
    locks: Mutex<HashMap<PullRequestTarget, PullRequestMutex>>,
}

impl PullRequestLocks {
    /// Waits until no other delivery is processing `target`.
    pub async fn lock(&self, target: &PullRequestTarget) -> PullRequestGuard<'_> {
        let mutex = self.locks.lock().entry(target.clone()).or_default().clone();
        let guard = mutex.clone().lock_owned().await;
        PullRequestGuard {
            registry: self,
            target: target.clone(),
            mutex,
            guard: Some(guard),
        }
    }

    fn release(&self, target: &PullRequestTarget, mutex: &PullRequestMutex) {
        let mut locks = self.locks.lock();
        // One reference is held by the registry and one by the releasing guard.
        if Arc::strong_count(mutex) == 2 {
            locks.remove(target);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().len()
    }
}

pub struct PullRequestGuard<'a> {
    registry: &'a PullRequestLocks,
    target: PullRequestTarget,
    mutex: PullRequestMutex,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for PullRequestGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.registry.release(&self.target, &self.mutex);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::PullRequestLocks;
    use crate::github::GithubRepoName;
    use crate::sizer::PullRequestTarget;

    fn target(number: u64) -> PullRequestTarget {
        PullRequestTarget {
            repository: GithubRepoName::new("acme", "widget"),
            number: number.into(),
        }
    }

    #[tokio::test]
    async fn release_removes_entry() {
        let locks = PullRequestLocks::default();
        {
            let _guard = locks.lock(&target(1)).await;
            assert_eq!(locks.len(), 1);
        }
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn different_pull_requests_do_not_block() {
        let locks = PullRequestLocks::default();
        let _first = locks.lock(&target(1)).await;
        let second = tokio::time::timeout(Duration::from_secs(1), locks.lock(&target(2))).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn same_pull_request_is_serialized() {
        let locks = Arc::new(PullRequestLocks::default());
        let first = locks.lock(&target(1)).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock(&target(1)).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(first);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(locks.len(), 0);
    }
}
