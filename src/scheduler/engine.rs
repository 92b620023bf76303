//! Scheduler engine: the single entry point driving the recycle loop.
//!
//! `tick` fires due entries, folds outcomes back into the catalog,
//! re-evaluates lifecycles, garbage-collects resolved history, and tops
//! up the forward queue. The engine is the single writer of scheduling
//! state: `tick` takes `&mut self`, so ticks never overlap, and
//! collaborator completions are folded in synchronously within the tick.

use crate::api::{EntryOutcome, PostId, PostStatus, QueueEntry, QueueStatus};
use crate::catalog::Catalog;
use crate::scheduler::config::SchedulerConfig;
use crate::scheduler::error::SchedulerError;
use crate::scheduler::{lifecycle, queue};
use crate::services::publisher::{PublishRequest, Publisher};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

/// One aggregated per-post error from a tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickError {
    pub post_id: Option<PostId>,
    pub message: String,
}

impl From<&SchedulerError> for TickError {
    fn from(error: &SchedulerError) -> Self {
        TickError {
            post_id: error.post_id(),
            message: error.to_string(),
        }
    }
}

/// Observability record of a single tick.
///
/// Failed and skipped entries appear with their status and reason; the
/// engine never drops an occurrence silently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickReport {
    /// Entries resolved `Posted` this tick.
    pub posted: Vec<QueueEntry>,
    /// Entries resolved `Failed` this tick.
    pub failed: Vec<QueueEntry>,
    /// Entries skipped at fire time (paused or removed posts).
    pub skipped: Vec<QueueEntry>,
    /// Posts expired by reconciliation.
    pub expired_posts: Vec<PostId>,
    /// Fresh `Scheduled` entries added by the refill pass.
    pub entries_added: usize,
    /// Resolved entries garbage-collected past the retention window.
    pub entries_collected: usize,
    /// Per-post errors; none of these aborted the tick.
    pub errors: Vec<TickError>,
}

impl TickReport {
    /// Whether the tick completed without any per-post errors.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total entries resolved or skipped this tick.
    pub fn fired_count(&self) -> usize {
        self.posted.len() + self.failed.len() + self.skipped.len()
    }
}

/// Top-level coordinator over the catalog, the publisher, and the policy
/// configuration.
pub struct SchedulerEngine {
    catalog: Catalog,
    publisher: Arc<dyn Publisher>,
    config: SchedulerConfig,
    rng: StdRng,
}

impl SchedulerEngine {
    /// Create an engine with entropy-seeded randomness.
    pub fn new(catalog: Catalog, publisher: Arc<dyn Publisher>, config: SchedulerConfig) -> Self {
        Self {
            catalog,
            publisher,
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create an engine with a fixed random seed, for reproducible runs.
    pub fn with_seed(
        catalog: Catalog,
        publisher: Arc<dyn Publisher>,
        config: SchedulerConfig,
        seed: u64,
    ) -> Self {
        Self {
            catalog,
            publisher,
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The shared catalog handle.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The active policy configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Run one scheduling cycle at the given instant.
    ///
    /// A per-post failure is recorded in the report and never aborts the
    /// batch for other posts.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> TickReport {
        let mut report = TickReport::default();
        let mut touched: BTreeSet<PostId> = BTreeSet::new();

        // 1. Fire due entries.
        let due = self.catalog.due_entries(now);
        info!(due = due.len(), now = %now, "tick started");
        for entry in due {
            self.fire_entry(entry, &mut report, &mut touched).await;
        }

        // 2. Re-evaluate lifecycles for touched posts.
        for post_id in touched {
            self.reconcile_post(post_id, &mut report);
        }

        // 3. Drop resolved history past the retention window.
        let cutoff = now - Duration::days(self.config.queue_retention_days as i64);
        report.entries_collected = self.catalog.gc_entries(cutoff);

        // 4. Top up the forward queue.
        let posts = self.catalog.posts_snapshot();
        let queue_snapshot = self.catalog.queue_snapshot();
        let (new_entries, refill_errors) =
            queue::refill_queue(&posts, &queue_snapshot, now, &self.config, &mut self.rng);
        report.entries_added = self.catalog.append_entries(new_entries);
        for error in &refill_errors {
            report.errors.push(TickError::from(error));
        }

        info!(
            posted = report.posted.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            added = report.entries_added,
            errors = report.errors.len(),
            "tick finished"
        );
        report
    }

    async fn fire_entry(
        &mut self,
        mut entry: QueueEntry,
        report: &mut TickReport,
        touched: &mut BTreeSet<PostId>,
    ) {
        let post = match self.catalog.post(entry.post_id) {
            Ok(post) => post,
            Err(_) => {
                // The post was deleted after the entry was scheduled.
                self.skip_entry(entry, "post removed from catalog", report);
                return;
            }
        };

        // Pause (or any other departure from Active) cancels pending
        // fires; checked at fire time, not just at refill time.
        if post.status != PostStatus::Active {
            let reason = format!("post {} at fire time", post.status);
            self.skip_entry(entry, &reason, report);
            return;
        }

        let request = PublishRequest {
            post_id: entry.post_id,
            platform: entry.platform.clone(),
            variation_index: entry.variation_index,
            content: post.content_for(entry.variation_index).to_string(),
        };

        let outcome =
            match tokio::time::timeout(self.config.publish_timeout(), self.publisher.publish(request))
                .await
            {
                Ok(Ok(receipt)) => EntryOutcome::Posted { at: receipt.posted_at },
                Ok(Err(reason)) => {
                    report.errors.push(TickError::from(&SchedulerError::PublishFailure {
                        post_id: entry.post_id,
                        platform: entry.platform.clone(),
                        reason: reason.clone(),
                    }));
                    EntryOutcome::Failed { reason }
                }
                Err(_) => {
                    let error = SchedulerError::PublishTimeout {
                        post_id: entry.post_id,
                        platform: entry.platform.clone(),
                        timeout_secs: self.config.publish_timeout_secs,
                    };
                    warn!(post_id = %entry.post_id, platform = %entry.platform, "publish timed out");
                    report.errors.push(TickError::from(&error));
                    EntryOutcome::Failed {
                        reason: error.to_string(),
                    }
                }
            };

        let (status, reason) = match &outcome {
            EntryOutcome::Posted { .. } => (QueueStatus::Posted, None),
            EntryOutcome::Failed { reason } => (QueueStatus::Failed, Some(reason.clone())),
        };
        if let Err(error) = self.catalog.resolve_entry(&entry.id, status, reason.clone()) {
            report.errors.push(TickError::from(&error));
            return;
        }
        let resolve_result = self
            .catalog
            .with_post_mut(entry.post_id, |post| {
                lifecycle::on_entry_resolved(post, &entry, &outcome)
            });
        if let Err(error) = resolve_result {
            report.errors.push(TickError::from(&error));
        }

        touched.insert(entry.post_id);
        entry.status = status;
        entry.reason = reason;
        match status {
            QueueStatus::Posted => report.posted.push(entry),
            _ => report.failed.push(entry),
        }
    }

    fn skip_entry(&self, mut entry: QueueEntry, reason: &str, report: &mut TickReport) {
        if let Err(error) =
            self.catalog
                .resolve_entry(&entry.id, QueueStatus::Skipped, Some(reason.to_string()))
        {
            report.errors.push(TickError::from(&error));
            return;
        }
        entry.status = QueueStatus::Skipped;
        entry.reason = Some(reason.to_string());
        report.skipped.push(entry);
    }

    fn reconcile_post(&self, post_id: PostId, report: &mut TickReport) {
        let post = match self.catalog.post(post_id) {
            Ok(post) => post,
            Err(_) => return,
        };
        let next = lifecycle::reconcile(&post, &self.config);
        if next != post.status {
            if let Err(error) = self.catalog.set_status(post_id, next) {
                report.errors.push(TickError::from(&error));
                return;
            }
            if next == PostStatus::Expired {
                report.expired_posts.push(post_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_report_counters() {
        let report = TickReport::default();
        assert!(report.is_clean());
        assert_eq!(report.fired_count(), 0);
    }

    #[test]
    fn test_tick_error_carries_post_id() {
        let error = SchedulerError::PostNotFound {
            post_id: PostId::new(12),
        };
        let tick_error = TickError::from(&error);
        assert_eq!(tick_error.post_id, Some(PostId::new(12)));
        assert!(tick_error.message.contains("12"));
    }
}
