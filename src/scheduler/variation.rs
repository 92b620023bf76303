//! Variation selector: which content body the next occurrence uses.
//!
//! Rotation is a cycle over `[-1, 0, .., len-1]` (-1 = base content) that
//! never repeats the immediately preceding index. Performance feedback may
//! bias the pick toward the best-performing variation; that bias is the
//! only feedback-driven non-determinism in the system and is toggleable
//! through [`SchedulerConfig`].

use crate::api::EvergreenPost;
use crate::scheduler::config::SchedulerConfig;
use rand::rngs::StdRng;
use rand::Rng;

/// Pick the variation index for the next occurrence of `post`.
///
/// `last_used` is the index of the immediately preceding occurrence, if
/// any. The result is always within `[-1, variations.len() - 1]`.
pub fn select_variation(
    post: &EvergreenPost,
    last_used: Option<i32>,
    config: &SchedulerConfig,
    rng: &mut StdRng,
) -> i32 {
    let len = post.variations.len() as i32;
    if !post.recycle.use_variations || len == 0 {
        return -1;
    }

    if let Some(best) = biased_pick(post, last_used, len, config, rng) {
        return best;
    }

    rotate_after(last_used, len)
}

/// Performance bias: prefer the best-known variation with the configured
/// weight once the post has enough recycle history, unless it would repeat
/// the previous occurrence.
fn biased_pick(
    post: &EvergreenPost,
    last_used: Option<i32>,
    len: i32,
    config: &SchedulerConfig,
    rng: &mut StdRng,
) -> Option<i32> {
    if !config.variation_bias_enabled {
        return None;
    }
    if post.recycle.current_recycles < config.variation_bias_min_recycles {
        return None;
    }
    let best = post.performance.best_variation_index?;
    if best < -1 || best >= len {
        return None;
    }
    if Some(best) == last_used {
        return None;
    }
    if rng.gen_bool(config.variation_bias_weight) {
        Some(best)
    } else {
        None
    }
}

/// Next index in the `[-1, 0, .., len-1]` cycle after `last_used`.
///
/// With no history the cycle starts at the base content.
fn rotate_after(last_used: Option<i32>, len: i32) -> i32 {
    match last_used {
        None => -1,
        Some(last) => {
            // Clamp unknown history into the cycle before advancing.
            let last = last.clamp(-1, len - 1);
            if last == len - 1 {
                -1
            } else {
                last + 1
            }
        }
    }
}
