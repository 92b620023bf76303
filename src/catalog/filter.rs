//! Read-only snapshot filters for the presentation collaborator.

use crate::api::{EvergreenPost, Platform, PostId, PostStatus, QueueEntry, QueueStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filter for catalog snapshots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    pub platform: Option<Platform>,
    pub recycling_enabled: Option<bool>,
}

impl PostFilter {
    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_recycling_enabled(mut self, enabled: bool) -> Self {
        self.recycling_enabled = Some(enabled);
        self
    }

    pub fn matches(&self, post: &EvergreenPost) -> bool {
        if let Some(status) = self.status {
            if post.status != status {
                return false;
            }
        }
        if let Some(ref platform) = self.platform {
            if !post.platforms.contains(platform) {
                return false;
            }
        }
        if let Some(enabled) = self.recycling_enabled {
            if post.recycle.enabled != enabled {
                return false;
            }
        }
        true
    }
}

/// Filter for queue snapshots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueFilter {
    pub post_id: Option<PostId>,
    pub platform: Option<Platform>,
    pub status: Option<QueueStatus>,
    /// Only entries scheduled at or before this instant.
    pub due_before: Option<DateTime<Utc>>,
}

impl QueueFilter {
    pub fn with_post(mut self, post_id: PostId) -> Self {
        self.post_id = Some(post_id);
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_status(mut self, status: QueueStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn due_before(mut self, instant: DateTime<Utc>) -> Self {
        self.due_before = Some(instant);
        self
    }

    pub fn matches(&self, entry: &QueueEntry) -> bool {
        if let Some(post_id) = self.post_id {
            if entry.post_id != post_id {
                return false;
            }
        }
        if let Some(ref platform) = self.platform {
            if entry.platform != *platform {
                return false;
            }
        }
        if let Some(status) = self.status {
            if entry.status != status {
                return false;
            }
        }
        if let Some(due) = self.due_before {
            if entry.scheduled_for > due {
                return false;
            }
        }
        true
    }
}
