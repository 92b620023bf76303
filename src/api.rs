//! Public API surface for the recycling scheduler.
//!
//! This file consolidates the domain types shared by the catalog, the
//! scheduler components, and the collaborator seams.
//! All types derive Serialize/Deserialize for JSON serialization.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Evergreen post identifier (catalog primary key).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PostId(pub i64);

impl PostId {
    pub fn new(value: i64) -> Self {
        PostId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<PostId> for i64 {
    fn from(id: PostId) -> Self {
        id.0
    }
}

/// Queue entry identifier (UUID v4, assigned by the queue builder).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub String);

impl EntryId {
    /// Generate a fresh random entry ID.
    pub fn generate() -> Self {
        EntryId(uuid::Uuid::new_v4().to_string())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Target platform identifier (e.g. "twitter", "linkedin").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Platform(pub String);

impl Platform {
    pub fn new(value: impl Into<String>) -> Self {
        Platform(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of an evergreen post.
///
/// Transitions: `Draft -> Active`, `Active <-> Paused`,
/// `{Active, Paused} -> Expired`. `Expired` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Active,
    Paused,
    Expired,
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PostStatus::Draft => "draft",
            PostStatus::Active => "active",
            PostStatus::Paused => "paused",
            PostStatus::Expired => "expired",
        };
        write!(f, "{}", label)
    }
}

/// Recycling configuration for a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecycleSettings {
    /// Whether the post participates in recycling at all.
    pub enabled: bool,
    /// Minimum spacing between recycles, in calendar days (> 0).
    pub min_interval_days: u32,
    /// Maximum spacing between recycles, in calendar days (>= min).
    pub max_interval_days: u32,
    /// Total number of recycles allowed for this post (> 0).
    pub max_recycles: u32,
    /// Recycles performed so far (<= max_recycles).
    #[serde(default)]
    pub current_recycles: u32,
    /// Whether alternate content variations rotate into the schedule.
    pub use_variations: bool,
    /// Whether the fire time is drawn at random within the interval bounds.
    pub randomize_time: bool,
}

impl RecycleSettings {
    /// Check the interval and counter invariants.
    ///
    /// Called at post creation; the interval policy re-checks the same
    /// bounds rather than panicking on corrupt state.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_interval_days == 0 || self.max_interval_days == 0 {
            return Err("Interval bounds must be positive".to_string());
        }
        if self.min_interval_days > self.max_interval_days {
            return Err(format!(
                "min_interval_days ({}) exceeds max_interval_days ({})",
                self.min_interval_days, self.max_interval_days
            ));
        }
        if self.max_recycles == 0 {
            return Err("max_recycles must be positive".to_string());
        }
        if self.current_recycles > self.max_recycles {
            return Err(format!(
                "current_recycles ({}) exceeds max_recycles ({})",
                self.current_recycles, self.max_recycles
            ));
        }
        Ok(())
    }

    /// Whether any recycles remain under the configured cap.
    pub fn recycles_remaining(&self) -> bool {
        self.current_recycles < self.max_recycles
    }
}

/// Rolling performance aggregate, written only via the analytics seam.
///
/// The scheduler reads this (variation bias, low-engagement expiry) but
/// never computes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Performance {
    /// Number of resolved publications recorded against this post.
    #[serde(default)]
    pub total_posts: u32,
    /// Rolling average engagement across publications.
    #[serde(default)]
    pub avg_engagement: f64,
    /// Variation index with the best engagement, if known (-1 = base).
    #[serde(default)]
    pub best_variation_index: Option<i32>,
}

/// Timing state for a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleState {
    /// When the post last fired, if ever.
    #[serde(default)]
    pub last_posted_at: Option<DateTime<Utc>>,
    /// The next planned fire time; cleared on resolution, recomputed on refill.
    #[serde(default)]
    pub next_post_at: Option<DateTime<Utc>>,
    /// Preferred local times of day, in priority order (may be empty).
    #[serde(default)]
    pub preferred_times: Vec<NaiveTime>,
    /// IANA timezone name for all calendar-day math (e.g. "Europe/Madrid").
    pub timezone: String,
}

impl ScheduleState {
    /// Fresh state for a never-posted post in the given timezone.
    pub fn new(timezone: impl Into<String>) -> Self {
        Self {
            last_posted_at: None,
            next_post_at: None,
            preferred_times: Vec::new(),
            timezone: timezone.into(),
        }
    }
}

/// A reusable content item intended for repeated, spaced-out republishing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvergreenPost {
    /// Catalog identifier.
    pub id: PostId,
    /// Canonical content body.
    pub base_content: String,
    /// Ordered alternate content bodies (may be empty).
    #[serde(default)]
    pub variations: Vec<String>,
    /// Target platforms; an empty set makes the post a scheduling no-op.
    #[serde(default)]
    pub platforms: Vec<Platform>,
    /// Recycling configuration.
    pub recycle: RecycleSettings,
    /// Analytics-maintained performance aggregate.
    #[serde(default)]
    pub performance: Performance,
    /// Timing state.
    pub schedule: ScheduleState,
    /// Lifecycle status.
    pub status: PostStatus,
}

impl EvergreenPost {
    /// Whether the queue builder should consider this post for refill.
    pub fn is_recycling_eligible(&self) -> bool {
        self.status == PostStatus::Active
            && self.recycle.enabled
            && self.recycle.recycles_remaining()
    }

    /// Resolve a variation index into the content to publish.
    ///
    /// `-1` (or any out-of-range index) resolves to the base content.
    pub fn content_for(&self, variation_index: i32) -> &str {
        if variation_index >= 0 {
            if let Some(body) = self.variations.get(variation_index as usize) {
                return body;
            }
        }
        &self.base_content
    }
}

/// Status of a single queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Scheduled,
    Posted,
    Failed,
    Skipped,
}

impl QueueStatus {
    /// Resolved entries are immutable and eligible for garbage collection.
    pub fn is_resolved(&self) -> bool {
        matches!(self, QueueStatus::Posted | QueueStatus::Failed)
    }
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            QueueStatus::Scheduled => "scheduled",
            QueueStatus::Posted => "posted",
            QueueStatus::Failed => "failed",
            QueueStatus::Skipped => "skipped",
        };
        write!(f, "{}", label)
    }
}

/// A single scheduled (future) or resolved (past) recycle occurrence for
/// one post on one platform.
///
/// Entries reference their post by ID; the queue never owns post data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: EntryId,
    /// Owning post.
    pub post_id: PostId,
    /// When the entry fires.
    pub scheduled_for: DateTime<Utc>,
    /// Content variation to publish; -1 selects the base content.
    pub variation_index: i32,
    /// Target platform.
    pub platform: Platform,
    pub status: QueueStatus,
    /// Failure or skip reason, surfaced to operators (never silently dropped).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl QueueEntry {
    /// Create a fresh entry in `Scheduled` state.
    pub fn scheduled(
        post_id: PostId,
        platform: Platform,
        scheduled_for: DateTime<Utc>,
        variation_index: i32,
    ) -> Self {
        Self {
            id: EntryId::generate(),
            post_id,
            scheduled_for,
            variation_index,
            platform,
            status: QueueStatus::Scheduled,
            reason: None,
        }
    }
}

/// Outcome of a fired entry, reported by the publishing collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EntryOutcome {
    /// The publish succeeded at the given timestamp.
    Posted { at: DateTime<Utc> },
    /// The publish failed; the post stays eligible for retry via refill.
    Failed { reason: String },
}
