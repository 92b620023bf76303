//! Error types for scheduling operations.
//!
//! Per-post errors are caught at the engine boundary and aggregated into
//! the tick report; none of these crash the engine.

use crate::api::{Platform, PostId, PostStatus};

/// Result type for scheduling operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Error type for scheduling operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchedulerError {
    /// Interval bounds are inverted or non-positive. Caught at post
    /// creation; fatal to that operation, not to the engine.
    #[error("Invalid interval for post {post_id}: min={min} max={max}")]
    InvalidInterval { post_id: PostId, min: u32, max: u32 },

    /// The duplicate-day guard exhausted its bounded retries. The post is
    /// skipped this tick and retried on the next refill.
    #[error("Scheduling conflict for post {post_id} on {platform}: no free day after {attempts} shifts")]
    SchedulingConflict {
        post_id: PostId,
        platform: Platform,
        attempts: u32,
    },

    /// The publishing collaborator did not answer within the timeout.
    /// The entry is marked Failed, never left Scheduled indefinitely.
    #[error("Publish timeout for post {post_id} on {platform} after {timeout_secs}s")]
    PublishTimeout {
        post_id: PostId,
        platform: Platform,
        timeout_secs: u64,
    },

    /// The publishing collaborator reported a failure.
    #[error("Publish failure for post {post_id} on {platform}: {reason}")]
    PublishFailure {
        post_id: PostId,
        platform: Platform,
        reason: String,
    },

    /// Requested post does not exist in the catalog.
    #[error("Post {post_id} not found")]
    PostNotFound { post_id: PostId },

    /// Illegal lifecycle transition (e.g. out of Expired).
    #[error("Invalid transition for post {post_id}: {from} -> {to}")]
    InvalidTransition {
        post_id: PostId,
        from: PostStatus,
        to: PostStatus,
    },

    /// Data validation failed before a catalog operation.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Configuration file or settings error.
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl SchedulerError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// The post this error concerns, when there is one.
    pub fn post_id(&self) -> Option<PostId> {
        match self {
            Self::InvalidInterval { post_id, .. }
            | Self::SchedulingConflict { post_id, .. }
            | Self::PublishTimeout { post_id, .. }
            | Self::PublishFailure { post_id, .. }
            | Self::PostNotFound { post_id }
            | Self::InvalidTransition { post_id, .. } => Some(*post_id),
            Self::Validation { .. } | Self::Configuration { .. } => None,
        }
    }

    /// Whether the condition clears itself on a later tick (retry via the
    /// normal refill cycle rather than a dedicated retry counter).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SchedulingConflict { .. }
                | Self::PublishTimeout { .. }
                | Self::PublishFailure { .. }
        )
    }
}
