use std::sync::Arc;

use services::{ArchiveService, CommentService, WebhookService};

use crate::Metrics;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub comments: Arc<CommentService>,
    pub webhook: Arc<WebhookService>,
    pub archive: Arc<ArchiveService>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(comments: CommentService, webhook: WebhookService, archive: ArchiveService) -> Self {
        Self {
            comments: Arc::new(comments),
            webhook: Arc::new(webhook),
            archive: Arc::new(archive),
            metrics: Arc::new(Metrics::new()),
        }
    }
}
