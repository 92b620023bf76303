//! In-memory catalog of posts and queue entries.
//!
//! Cloning a [`Catalog`] clones the handle, not the data; all clones share
//! one store. Reads return owned snapshots so no lock is held while the
//! caller works with the data.

use crate::api::{
    EvergreenPost, Performance, PostId, PostStatus, QueueEntry, QueueStatus,
};
use crate::catalog::filter::{PostFilter, QueueFilter};
use crate::models::post as post_model;
use crate::models::CatalogDocument;
use crate::scheduler::error::{SchedulerError, SchedulerResult};
use crate::scheduler::lifecycle;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Default)]
struct CatalogState {
    posts: HashMap<PostId, EvergreenPost>,
    queue: Vec<QueueEntry>,
}

/// Shared handle to the post catalog and recycle queue.
#[derive(Clone, Default)]
pub struct Catalog {
    state: Arc<RwLock<CatalogState>>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of posts in the catalog.
    pub fn post_count(&self) -> usize {
        self.state.read().posts.len()
    }

    // ------------------------------------------------------------------
    // Authoring collaborator surface
    // ------------------------------------------------------------------

    /// Load every post from a parsed catalog document.
    ///
    /// Returns the number of posts inserted. Fails atomically on the first
    /// duplicate ID; document-level validation already ran during parsing.
    pub fn load_document(&self, document: CatalogDocument) -> SchedulerResult<usize> {
        let mut state = self.state.write();
        for post in &document.posts {
            if state.posts.contains_key(&post.id) {
                return Err(SchedulerError::validation(format!(
                    "Post {} already exists",
                    post.id
                )));
            }
        }
        let count = document.posts.len();
        for post in document.posts {
            state.posts.insert(post.id, post);
        }
        debug!(posts = count, checksum = %document.checksum, "loaded catalog document");
        Ok(count)
    }

    /// Insert a new post after validating the catalog invariants.
    pub fn insert_post(&self, post: EvergreenPost) -> SchedulerResult<()> {
        post_model::validate_post(&post).map_err(SchedulerError::validation)?;

        let mut state = self.state.write();
        if state.posts.contains_key(&post.id) {
            return Err(SchedulerError::validation(format!(
                "Post {} already exists",
                post.id
            )));
        }
        state.posts.insert(post.id, post);
        Ok(())
    }

    /// Replace an existing post's content and settings.
    ///
    /// Status, the recycle counter, timing anchors, and the performance
    /// aggregate are not writable through this path: status goes through
    /// the transition methods, counters and anchors belong to the engine,
    /// and performance belongs to the analytics seam.
    pub fn update_post(&self, post: EvergreenPost) -> SchedulerResult<()> {
        post_model::validate_post(&post).map_err(SchedulerError::validation)?;

        let mut state = self.state.write();
        match state.posts.get_mut(&post.id) {
            Some(existing) => {
                let status = existing.status;
                let current_recycles = existing.recycle.current_recycles;
                let performance = existing.performance.clone();
                let last_posted_at = existing.schedule.last_posted_at;
                let next_post_at = existing.schedule.next_post_at;
                *existing = post;
                existing.status = status;
                existing.recycle.current_recycles = current_recycles;
                existing.performance = performance;
                existing.schedule.last_posted_at = last_posted_at;
                existing.schedule.next_post_at = next_post_at;
                Ok(())
            }
            None => Err(SchedulerError::PostNotFound { post_id: post.id }),
        }
    }

    /// Activate a post (`Draft -> Active` or `Paused -> Active`).
    pub fn activate(&self, post_id: PostId) -> SchedulerResult<()> {
        self.transition(post_id, PostStatus::Active)
    }

    /// Pause a post.
    ///
    /// Pending `Scheduled` entries stay in the queue but are re-checked at
    /// fire time, so a paused post never fires.
    pub fn pause(&self, post_id: PostId) -> SchedulerResult<()> {
        self.transition(post_id, PostStatus::Paused)
    }

    /// Remove a post entirely (external deletion operation).
    ///
    /// Pending `Scheduled` entries for the post are dropped; resolved
    /// history is kept until garbage collection.
    pub fn remove_post(&self, post_id: PostId) -> SchedulerResult<EvergreenPost> {
        let mut state = self.state.write();
        let post = state
            .posts
            .remove(&post_id)
            .ok_or(SchedulerError::PostNotFound { post_id })?;
        state
            .queue
            .retain(|entry| entry.post_id != post_id || entry.status != QueueStatus::Scheduled);
        Ok(post)
    }

    // ------------------------------------------------------------------
    // Analytics collaborator surface
    // ------------------------------------------------------------------

    /// Overwrite a post's performance aggregate.
    ///
    /// This is the only write path for `performance`; the scheduler itself
    /// never computes engagement.
    pub fn update_performance(
        &self,
        post_id: PostId,
        performance: Performance,
    ) -> SchedulerResult<()> {
        let mut state = self.state.write();
        match state.posts.get_mut(&post_id) {
            Some(post) => {
                post.performance = performance;
                Ok(())
            }
            None => Err(SchedulerError::PostNotFound { post_id }),
        }
    }

    // ------------------------------------------------------------------
    // Presentation collaborator surface (read-only)
    // ------------------------------------------------------------------

    /// Snapshot of posts matching the filter, ordered by ID.
    pub fn list_posts(&self, filter: &PostFilter) -> Vec<EvergreenPost> {
        let state = self.state.read();
        let mut posts: Vec<EvergreenPost> = state
            .posts
            .values()
            .filter(|post| filter.matches(post))
            .cloned()
            .collect();
        posts.sort_by_key(|post| post.id);
        posts
    }

    /// Snapshot of queue entries matching the filter, ordered by fire time.
    pub fn list_queue(&self, filter: &QueueFilter) -> Vec<QueueEntry> {
        let state = self.state.read();
        let mut entries: Vec<QueueEntry> = state
            .queue
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.scheduled_for);
        entries
    }

    /// Fetch a single post.
    pub fn post(&self, post_id: PostId) -> SchedulerResult<EvergreenPost> {
        self.state
            .read()
            .posts
            .get(&post_id)
            .cloned()
            .ok_or(SchedulerError::PostNotFound { post_id })
    }

    // ------------------------------------------------------------------
    // Engine surface (crate-internal writers)
    // ------------------------------------------------------------------

    /// Full post snapshot for a refill pass.
    pub(crate) fn posts_snapshot(&self) -> Vec<EvergreenPost> {
        let mut posts: Vec<EvergreenPost> = self.state.read().posts.values().cloned().collect();
        posts.sort_by_key(|post| post.id);
        posts
    }

    /// Full queue snapshot for a refill pass.
    pub(crate) fn queue_snapshot(&self) -> Vec<QueueEntry> {
        self.state.read().queue.clone()
    }

    /// `Scheduled` entries due at or before `now`, ordered by fire time.
    pub(crate) fn due_entries(&self, now: DateTime<Utc>) -> Vec<QueueEntry> {
        let state = self.state.read();
        let mut due: Vec<QueueEntry> = state
            .queue
            .iter()
            .filter(|entry| entry.status == QueueStatus::Scheduled && entry.scheduled_for <= now)
            .cloned()
            .collect();
        due.sort_by_key(|entry| entry.scheduled_for);
        due
    }

    /// Resolve a `Scheduled` entry. Resolved entries are immutable.
    pub(crate) fn resolve_entry(
        &self,
        entry_id: &crate::api::EntryId,
        status: QueueStatus,
        reason: Option<String>,
    ) -> SchedulerResult<()> {
        let mut state = self.state.write();
        let entry = state
            .queue
            .iter_mut()
            .find(|entry| entry.id == *entry_id)
            .ok_or_else(|| {
                SchedulerError::validation(format!("Queue entry {} not found", entry_id))
            })?;
        if entry.status != QueueStatus::Scheduled {
            return Err(SchedulerError::validation(format!(
                "Queue entry {} already resolved ({})",
                entry_id, entry.status
            )));
        }
        entry.status = status;
        entry.reason = reason;
        Ok(())
    }

    /// Append refill output, enforcing the one-`Scheduled`-entry-per
    /// `(post, platform)` invariant. Returns the number actually added.
    pub(crate) fn append_entries(&self, entries: Vec<QueueEntry>) -> usize {
        let mut state = self.state.write();
        let mut added = 0;
        for entry in entries {
            let duplicate = state.queue.iter().any(|existing| {
                existing.post_id == entry.post_id
                    && existing.platform == entry.platform
                    && existing.status == QueueStatus::Scheduled
            });
            if duplicate {
                warn!(
                    post_id = %entry.post_id,
                    platform = %entry.platform,
                    "dropping duplicate scheduled entry"
                );
                continue;
            }
            // Keep the post's next-fire hint in sync with its earliest entry.
            if entry.status == QueueStatus::Scheduled {
                if let Some(post) = state.posts.get_mut(&entry.post_id) {
                    match post.schedule.next_post_at {
                        Some(next) if next <= entry.scheduled_for => {}
                        _ => post.schedule.next_post_at = Some(entry.scheduled_for),
                    }
                }
            }
            state.queue.push(entry);
            added += 1;
        }
        added
    }

    /// Mutate a post in place (engine bookkeeping).
    pub(crate) fn with_post_mut<F>(&self, post_id: PostId, f: F) -> SchedulerResult<()>
    where
        F: FnOnce(&mut EvergreenPost),
    {
        let mut state = self.state.write();
        match state.posts.get_mut(&post_id) {
            Some(post) => {
                f(post);
                Ok(())
            }
            None => Err(SchedulerError::PostNotFound { post_id }),
        }
    }

    /// Force a status (reconcile outcome); bypasses the explicit-transition
    /// table only for the transitions reconcile itself produces.
    pub(crate) fn set_status(&self, post_id: PostId, status: PostStatus) -> SchedulerResult<()> {
        self.with_post_mut(post_id, |post| post.status = status)
    }

    /// Drop resolved and skipped entries scheduled before `cutoff`.
    pub(crate) fn gc_entries(&self, cutoff: DateTime<Utc>) -> usize {
        let mut state = self.state.write();
        let before = state.queue.len();
        state.queue.retain(|entry| {
            entry.status == QueueStatus::Scheduled || entry.scheduled_for >= cutoff
        });
        before - state.queue.len()
    }

    fn transition(&self, post_id: PostId, to: PostStatus) -> SchedulerResult<()> {
        let mut state = self.state.write();
        let post = state
            .posts
            .get_mut(&post_id)
            .ok_or(SchedulerError::PostNotFound { post_id })?;
        if !lifecycle::transition_allowed(post.status, to) {
            return Err(SchedulerError::InvalidTransition {
                post_id,
                from: post.status,
                to,
            });
        }
        debug!(post_id = %post_id, from = %post.status, to = %to, "status transition");
        post.status = to;
        Ok(())
    }
}
