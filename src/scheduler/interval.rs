//! Interval policy: when a post becomes due again.
//!
//! Pure given post state, the clock, and the supplied random source. The
//! deterministic path uses the floor midpoint of the interval bounds so
//! schedules are reproducible; randomized timing is opt-in per post and
//! draws only from the caller's RNG.

use crate::api::EvergreenPost;
use crate::models::time;
use crate::scheduler::config::SchedulerConfig;
use crate::scheduler::error::{SchedulerError, SchedulerResult};
use chrono::{DateTime, Days, NaiveTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;

/// Compute the next valid fire time for a post.
///
/// - Never-posted posts are eligible immediately (the duplicate guard
///   still applies downstream).
/// - Otherwise the offset in calendar days is the floor midpoint of
///   `[min, max]`, or a uniform draw when `randomize_time` is set.
/// - The time of day comes from the post's preferred times (first entry
///   deterministically, uniform draw when randomized), falling back to
///   the configured diurnal anchor, applied in the post's timezone.
pub fn next_fire_time(
    post: &EvergreenPost,
    now: DateTime<Utc>,
    config: &SchedulerConfig,
    rng: &mut StdRng,
) -> SchedulerResult<DateTime<Utc>> {
    let min = post.recycle.min_interval_days;
    let max = post.recycle.max_interval_days;
    if min == 0 || max == 0 || min > max {
        return Err(SchedulerError::InvalidInterval {
            post_id: post.id,
            min,
            max,
        });
    }

    let last = match post.schedule.last_posted_at {
        Some(last) => last,
        None => return Ok(now),
    };

    let offset_days = if post.recycle.randomize_time {
        rng.gen_range(min..=max)
    } else {
        // min + (max - min) / 2: midpoint without overflowing the sum.
        min + (max - min) / 2
    };

    let time_of_day = pick_time_of_day(post, config, rng);

    let tz = time::resolve_timezone(&post.schedule.timezone);
    let target_day = time::local_day(last, tz)
        .checked_add_days(Days::new(offset_days as u64))
        .ok_or(SchedulerError::InvalidInterval {
            post_id: post.id,
            min,
            max,
        })?;
    Ok(time::at_local_time(target_day, time_of_day, tz))
}

fn pick_time_of_day(
    post: &EvergreenPost,
    config: &SchedulerConfig,
    rng: &mut StdRng,
) -> NaiveTime {
    let preferred = &post.schedule.preferred_times;
    if preferred.is_empty() {
        return config.default_post_time();
    }
    if post.recycle.randomize_time {
        preferred[rng.gen_range(0..preferred.len())]
    } else {
        preferred[0]
    }
}
