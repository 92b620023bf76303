//! Inbound analytics seam.
//!
//! The analytics collaborator periodically reports per-post performance.
//! The scheduler folds the report into the catalog verbatim; it is read
//! by the variation selector and the lifecycle manager but never
//! computed here.

use crate::api::{Performance, PostId};
use crate::catalog::Catalog;
use crate::scheduler::error::SchedulerResult;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A performance report from the analytics collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceUpdate {
    pub total_posts: u32,
    pub avg_engagement: f64,
    /// Best-performing variation, if the collaborator has a verdict
    /// (-1 = base content).
    #[serde(default)]
    pub best_variation_index: Option<i32>,
}

/// Apply a performance report to a post.
pub fn apply_performance_update(
    catalog: &Catalog,
    post_id: PostId,
    update: PerformanceUpdate,
) -> SchedulerResult<()> {
    debug!(
        post_id = %post_id,
        avg_engagement = update.avg_engagement,
        "applying performance update"
    );
    catalog.update_performance(
        post_id,
        Performance {
            total_posts: update.total_posts,
            avg_engagement: update.avg_engagement,
            best_variation_index: update.best_variation_index,
        },
    )
}
