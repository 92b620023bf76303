//! Lifecycle manager: recycle counters and post expiration.
//!
//! Tracks each post's recycle count against its cap and its engagement
//! against the configured floor, and owns the legality of status
//! transitions. Pause/resume never resets counters or timing anchors;
//! `current_recycles` and `last_posted_at` persist across pauses.

use crate::api::{EntryOutcome, EvergreenPost, PostStatus, QueueEntry};
use crate::scheduler::config::SchedulerConfig;
use tracing::{debug, info};

/// Fold a resolved entry back into its post.
///
/// `Posted` advances the recycle counter and timing anchors; `Failed`
/// leaves the counters untouched so the post retries through the normal
/// refill cycle.
pub fn on_entry_resolved(post: &mut EvergreenPost, entry: &QueueEntry, outcome: &EntryOutcome) {
    match outcome {
        EntryOutcome::Posted { .. } => {
            post.recycle.current_recycles += 1;
            post.schedule.last_posted_at = Some(entry.scheduled_for);
            // Recomputed by the next refill.
            post.schedule.next_post_at = None;
            post.performance.total_posts += 1;
            debug!(
                post_id = %post.id,
                recycles = post.recycle.current_recycles,
                "recorded publication"
            );
        }
        EntryOutcome::Failed { reason } => {
            debug!(post_id = %post.id, reason = %reason, "publication failed, no counter change");
        }
    }
}

/// Re-evaluate a post's status against the expiration rules.
///
/// `Expired` is terminal; a post that reaches it produces no further
/// queue entries. Posts with no recorded publications are never expired
/// for low engagement — the default 0.0 average would otherwise expire
/// them before their first outcome.
pub fn reconcile(post: &EvergreenPost, config: &SchedulerConfig) -> PostStatus {
    if post.status == PostStatus::Expired {
        return PostStatus::Expired;
    }
    if !matches!(post.status, PostStatus::Active | PostStatus::Paused) {
        return post.status;
    }

    if config.auto_expire_after_max
        && post.recycle.current_recycles >= post.recycle.max_recycles
    {
        info!(post_id = %post.id, max_recycles = post.recycle.max_recycles, "post exhausted recycle cap");
        return PostStatus::Expired;
    }

    if config.expire_on_low_engagement
        && post.performance.total_posts > 0
        && post.performance.avg_engagement < config.engagement_floor
    {
        info!(
            post_id = %post.id,
            avg_engagement = post.performance.avg_engagement,
            floor = config.engagement_floor,
            "post expired on low engagement"
        );
        return PostStatus::Expired;
    }

    post.status
}

/// Legality table for explicit status transitions.
///
/// `Draft -> Active` (activation), `Active <-> Paused`, and
/// `{Active, Paused} -> Expired` (reconcile only). Nothing leaves
/// `Expired`.
pub fn transition_allowed(from: PostStatus, to: PostStatus) -> bool {
    use PostStatus::*;
    matches!(
        (from, to),
        (Draft, Active) | (Active, Paused) | (Paused, Active) | (Active, Expired) | (Paused, Expired)
    )
}
