use std::sync::Arc;

use crate::config::Config;
use crate::sizer::{PullRequestLocks, RepositoryClient};

/// Everything a delivery needs to be processed. Shared by all deliveries.
pub struct SizerContext {
    pub config: Arc<Config>,
    pub client: Arc<dyn RepositoryClient>,
    pub locks: PullRequestLocks,
}

impl SizerContext {
    pub fn new(config: Arc<Config>, client: Arc<dyn RepositoryClient>) -> Self {
        Self {
            config,
            client,
            locks: PullRequestLocks::default(),
        }
    }
}
