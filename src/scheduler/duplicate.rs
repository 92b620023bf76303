//! Duplicate guard: one occurrence of a post per calendar day.
//!
//! When `avoid_duplicate_days` is set (the process-wide default), a
//! candidate fire time is rejected if any `Scheduled` or `Posted` entry
//! for the same post lands on the same calendar day in the post's
//! timezone, regardless of platform. The queue builder resolves
//! rejections by shifting forward one day at a time within a bounded
//! retry budget.

use crate::api::{PostId, QueueEntry, QueueStatus};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::models::time;

/// Check whether `candidate` may be scheduled for `post_id`.
///
/// `queue` is the combined view of existing entries and any entries the
/// current refill pass has already produced; `Skipped` and `Failed`
/// entries never block a day.
pub fn is_allowed(
    post_id: PostId,
    candidate: DateTime<Utc>,
    queue: &[QueueEntry],
    tz: Tz,
    avoid_duplicate_days: bool,
) -> bool {
    if !avoid_duplicate_days {
        return true;
    }

    let candidate_day = time::local_day(candidate, tz);
    !queue.iter().any(|entry| {
        entry.post_id == post_id
            && matches!(entry.status, QueueStatus::Scheduled | QueueStatus::Posted)
            && time::local_day(entry.scheduled_for, tz) == candidate_day
    })
}
