//! # services
//!
//! Application services sitting between the HTTP adapters and the ports:
//! comment ingestion, the chat-command webhook, archive reads and the
//! analysis publisher run by the update workflow.

pub mod analysis;
pub mod archive;
pub mod comments;
pub mod identity;
pub mod webhook;

pub use analysis::AnalysisService;
pub use archive::ArchiveService;
pub use comments::CommentService;
pub use identity::client_key;
pub use webhook::{ChatUpdate, WebhookOutcome, WebhookService, WebhookSettings};
