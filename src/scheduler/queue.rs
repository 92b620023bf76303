//! Recycle queue builder: materializes forward-looking queue entries.
//!
//! The builder walks the eligible posts and tops up one `Scheduled` entry
//! per `(post, platform)` pair, composing the interval policy, the
//! variation selector, and the duplicate guard. It is idempotent: calling
//! it again without intervening resolutions produces nothing new.

use crate::api::{EvergreenPost, PostId, QueueEntry, QueueStatus};
use crate::models::time;
use crate::scheduler::config::SchedulerConfig;
use crate::scheduler::error::SchedulerError;
use crate::scheduler::{duplicate, interval, variation};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use tracing::{debug, warn};

/// Top up the queue for every eligible post.
///
/// Returns the new `Scheduled` entries together with the per-post errors
/// collected along the way; an error for one post never aborts the batch.
pub fn refill_queue(
    posts: &[EvergreenPost],
    existing_queue: &[QueueEntry],
    now: DateTime<Utc>,
    config: &SchedulerConfig,
    rng: &mut StdRng,
) -> (Vec<QueueEntry>, Vec<SchedulerError>) {
    let mut new_entries: Vec<QueueEntry> = Vec::new();
    let mut errors: Vec<SchedulerError> = Vec::new();

    for post in posts {
        if !post.is_recycling_eligible() {
            continue;
        }
        // Empty platform sets are a no-op, not an error.
        if post.platforms.is_empty() {
            continue;
        }

        let tz = time::resolve_timezone(&post.schedule.timezone);

        for platform in &post.platforms {
            let already_scheduled = existing_queue
                .iter()
                .chain(new_entries.iter())
                .any(|entry| {
                    entry.post_id == post.id
                        && entry.platform == *platform
                        && entry.status == QueueStatus::Scheduled
                });
            if already_scheduled {
                continue;
            }

            let base = match interval::next_fire_time(post, now, config, rng) {
                Ok(base) => base,
                Err(e) => {
                    warn!(post_id = %post.id, error = %e, "interval policy rejected post");
                    errors.push(e);
                    // Every platform of this post would fail the same way.
                    break;
                }
            };

            let last_used = last_variation(post.id, existing_queue, &new_entries);
            let variation_index = variation::select_variation(post, last_used, config, rng);

            match place_candidate(post, platform, base, &new_entries, existing_queue, tz, config) {
                Ok(scheduled_for) => {
                    debug!(
                        post_id = %post.id,
                        platform = %platform,
                        scheduled_for = %scheduled_for,
                        variation_index,
                        "queued recycle occurrence"
                    );
                    new_entries.push(QueueEntry::scheduled(
                        post.id,
                        platform.clone(),
                        scheduled_for,
                        variation_index,
                    ));
                }
                Err(e) => {
                    warn!(post_id = %post.id, platform = %platform, error = %e, "could not place entry");
                    errors.push(e);
                }
            }
        }
    }

    (new_entries, errors)
}

/// Resolve duplicate-day rejections by shifting one day forward at a time,
/// within the configured retry budget.
///
/// A shifted candidate must still honor the post's maximum interval: a
/// placement that would stretch the gap past `max_interval_days` is a
/// conflict, not a schedulable entry.
fn place_candidate(
    post: &EvergreenPost,
    platform: &crate::api::Platform,
    base: DateTime<Utc>,
    new_entries: &[QueueEntry],
    existing_queue: &[QueueEntry],
    tz: chrono_tz::Tz,
    config: &SchedulerConfig,
) -> Result<DateTime<Utc>, SchedulerError> {
    let combined: Vec<QueueEntry> = existing_queue
        .iter()
        .chain(new_entries.iter())
        .cloned()
        .collect();

    let mut candidate = base;
    let mut shifts = 0;
    loop {
        let past_max = post.schedule.last_posted_at.is_some_and(|last| {
            time::days_between(last, candidate, tz) > post.recycle.max_interval_days as i64
        });
        if past_max {
            break;
        }

        if duplicate::is_allowed(post.id, candidate, &combined, tz, config.avoid_duplicate_days) {
            if shifts > 0 {
                debug!(post_id = %post.id, shifts, "duplicate-day guard shifted candidate");
            }
            return Ok(candidate);
        }

        if shifts == config.duplicate_shift_limit {
            break;
        }
        candidate += Duration::days(1);
        shifts += 1;
    }

    // `shifts` is the number of one-day moves actually applied before
    // giving up, whether the retry budget or the interval cap ended it.
    Err(SchedulerError::SchedulingConflict {
        post_id: post.id,
        platform: platform.clone(),
        attempts: shifts,
    })
}

/// The variation index of the most recent occurrence of `post_id`, taken
/// over resolved history and entries already placed in this pass.
pub fn last_variation(
    post_id: PostId,
    existing_queue: &[QueueEntry],
    new_entries: &[QueueEntry],
) -> Option<i32> {
    existing_queue
        .iter()
        .chain(new_entries.iter())
        .filter(|entry| {
            entry.post_id == post_id
                && matches!(entry.status, QueueStatus::Posted | QueueStatus::Scheduled)
        })
        .max_by_key(|entry| entry.scheduled_for)
        .map(|entry| entry.variation_index)
}
