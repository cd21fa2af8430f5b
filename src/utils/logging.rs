use std::fmt::Debug;

use tracing::span::Span;

pub trait LogError {
    fn log_error(&self, error: &dyn Debug);
}

impl LogError for Span {
    fn log_error(&self, error: &dyn Debug) {
        self.in_scope(|| {
            tracing::error!("Error: {error:?}");
        });
    }
}
