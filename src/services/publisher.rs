//! Outbound publishing seam.
//!
//! The engine resolves the content for an entry and hands it to a
//! `Publisher`; what happens on the wire is the collaborator's business.
//! Calls are bounded by the engine's publish timeout, after which the
//! entry is marked `Failed` rather than left `Scheduled` indefinitely.

use crate::api::{Platform, PostId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One publication hand-off: a single post occurrence on one platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRequest {
    pub post_id: PostId,
    pub platform: Platform,
    /// Variation used for this occurrence (-1 = base content).
    pub variation_index: i32,
    /// Resolved content body to publish.
    pub content: String,
}

/// Acknowledgement of a successful publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishReceipt {
    /// When the collaborator actually posted the content.
    pub posted_at: DateTime<Utc>,
}

/// External publishing collaborator.
///
/// Implementations must be cheap to share (`Arc<dyn Publisher>`); the
/// engine awaits one call at a time, so no internal ordering is required.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish one occurrence. A returned error string becomes the
    /// entry's failure reason; the post retries via the normal refill
    /// cycle.
    async fn publish(&self, request: PublishRequest) -> Result<PublishReceipt, String>;
}
