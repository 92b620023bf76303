//! Cross-component scheduler tests: queue refill composition and full
//! engine ticks against a stub publisher.

use crate::api::{
    EvergreenPost, Performance, Platform, PostId, PostStatus, QueueEntry, QueueStatus,
    RecycleSettings, ScheduleState,
};
use crate::catalog::Catalog;
use crate::models::time;
use crate::scheduler::config::SchedulerConfig;
use crate::scheduler::engine::SchedulerEngine;
use crate::scheduler::error::SchedulerError;
use crate::scheduler::{interval, queue};
use crate::services::publisher::{PublishReceipt, PublishRequest, Publisher};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

fn sample_post(id: i64) -> EvergreenPost {
    EvergreenPost {
        id: PostId::new(id),
        base_content: "Ship early, ship often.".to_string(),
        variations: vec![
            "Shipping early beats shipping perfect.".to_string(),
            "Release cadence is a feature.".to_string(),
        ],
        platforms: vec![Platform::new("twitter")],
        recycle: RecycleSettings {
            enabled: true,
            min_interval_days: 5,
            max_interval_days: 10,
            max_recycles: 5,
            current_recycles: 0,
            use_variations: true,
            randomize_time: false,
        },
        performance: Performance::default(),
        schedule: ScheduleState::new("UTC"),
        status: PostStatus::Active,
    }
}

fn noon(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

#[test]
fn test_refill_creates_one_entry_per_platform() {
    let mut post = sample_post(1);
    post.platforms = vec![Platform::new("twitter"), Platform::new("linkedin")];
    post.schedule.last_posted_at = Some(noon(2026, 3, 1));
    let config = SchedulerConfig::default();

    let (entries, errors) = queue::refill_queue(&[post], &[], noon(2026, 3, 2), &config, &mut rng(7));

    assert!(errors.is_empty());
    assert_eq!(entries.len(), 2);
    let platforms: Vec<&str> = entries.iter().map(|e| e.platform.value()).collect();
    assert!(platforms.contains(&"twitter"));
    assert!(platforms.contains(&"linkedin"));
    assert!(entries.iter().all(|e| e.status == QueueStatus::Scheduled));
}

#[test]
fn test_refill_is_idempotent() {
    let post = sample_post(1);
    let config = SchedulerConfig::default();
    let now = noon(2026, 3, 2);

    let (first, _) = queue::refill_queue(
        std::slice::from_ref(&post),
        &[],
        now,
        &config,
        &mut rng(7),
    );
    assert_eq!(first.len(), 1);

    let (second, errors) =
        queue::refill_queue(std::slice::from_ref(&post), &first, now, &config, &mut rng(7));
    assert!(second.is_empty());
    assert!(errors.is_empty());
}

#[test]
fn test_refill_skips_ineligible_posts() {
    let mut paused = sample_post(1);
    paused.status = PostStatus::Paused;
    let mut disabled = sample_post(2);
    disabled.recycle.enabled = false;
    let mut exhausted = sample_post(3);
    exhausted.recycle.current_recycles = exhausted.recycle.max_recycles;
    let config = SchedulerConfig::default();

    let (entries, errors) = queue::refill_queue(
        &[paused, disabled, exhausted],
        &[],
        noon(2026, 3, 2),
        &config,
        &mut rng(7),
    );

    assert!(entries.is_empty());
    assert!(errors.is_empty());
}

#[test]
fn test_duplicate_day_shifts_second_platform() {
    let mut post = sample_post(1);
    post.platforms = vec![Platform::new("twitter"), Platform::new("linkedin")];
    post.schedule.last_posted_at = Some(noon(2026, 3, 1));
    let config = SchedulerConfig::default();
    let tz = time::resolve_timezone("UTC");

    let (entries, errors) = queue::refill_queue(
        std::slice::from_ref(&post),
        &[],
        noon(2026, 3, 2),
        &config,
        &mut rng(7),
    );

    assert!(errors.is_empty());
    assert_eq!(entries.len(), 2);
    let first_day = time::local_day(entries[0].scheduled_for, tz);
    let second_day = time::local_day(entries[1].scheduled_for, tz);
    assert_ne!(first_day, second_day);
    assert_eq!(second_day, first_day + Duration::days(1));
}

#[test]
fn test_fire_times_stay_within_interval_bounds() {
    let mut post = sample_post(1);
    post.recycle.min_interval_days = 3;
    post.recycle.max_interval_days = 9;
    post.recycle.randomize_time = true;
    post.schedule.last_posted_at = Some(noon(2026, 3, 1));
    let config = SchedulerConfig::default();
    let tz = time::resolve_timezone("UTC");

    for seed in 0..32 {
        let fire = interval::next_fire_time(&post, noon(2026, 3, 2), &config, &mut rng(seed))
            .unwrap();
        let gap = time::days_between(post.schedule.last_posted_at.unwrap(), fire, tz);
        assert!((3..=9).contains(&gap), "seed {} produced gap {}", seed, gap);
    }
}

#[test]
fn test_invalid_interval_reported_without_entries() {
    let mut post = sample_post(1);
    post.recycle.min_interval_days = 10;
    post.recycle.max_interval_days = 5;
    let config = SchedulerConfig::default();

    let (entries, errors) = queue::refill_queue(
        std::slice::from_ref(&post),
        &[],
        noon(2026, 3, 2),
        &config,
        &mut rng(7),
    );

    assert!(entries.is_empty());
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0],
        SchedulerError::InvalidInterval { min: 10, max: 5, .. }
    ));
}

#[test]
fn test_conflict_reports_actual_shift_count() {
    // A fixed 5-day interval with day 5 already taken: the one allowed
    // shift lands past the interval cap, so the conflict reports a single
    // shift, not the full retry budget.
    let mut post = sample_post(1);
    post.recycle.min_interval_days = 5;
    post.recycle.max_interval_days = 5;
    post.schedule.last_posted_at = Some(noon(2026, 3, 1));
    let mut blocker =
        QueueEntry::scheduled(post.id, Platform::new("twitter"), noon(2026, 3, 6), -1);
    blocker.status = QueueStatus::Posted;
    let config = SchedulerConfig::default();

    let (entries, errors) = queue::refill_queue(
        std::slice::from_ref(&post),
        &[blocker],
        noon(2026, 3, 2),
        &config,
        &mut rng(7),
    );

    assert!(entries.is_empty());
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0],
        SchedulerError::SchedulingConflict { attempts: 1, .. }
    ));
}

#[test]
fn test_conflict_after_exhausted_retry_budget() {
    // Every day of the retry window is taken; the conflict reports the
    // whole budget. Midpoint of [5, 20] is 12 days, so the base candidate
    // lands on March 13 and the window runs through March 20.
    let mut post = sample_post(1);
    post.recycle.min_interval_days = 5;
    post.recycle.max_interval_days = 20;
    post.schedule.last_posted_at = Some(noon(2026, 3, 1));
    let config = SchedulerConfig::default();
    let blockers: Vec<QueueEntry> = (0..=config.duplicate_shift_limit as i64)
        .map(|day| {
            let mut entry = QueueEntry::scheduled(
                post.id,
                Platform::new("twitter"),
                noon(2026, 3, 13) + Duration::days(day),
                -1,
            );
            entry.status = QueueStatus::Posted;
            entry
        })
        .collect();

    let (entries, errors) = queue::refill_queue(
        std::slice::from_ref(&post),
        &blockers,
        noon(2026, 3, 2),
        &config,
        &mut rng(7),
    );

    assert!(entries.is_empty());
    assert!(matches!(
        errors[0],
        SchedulerError::SchedulingConflict { attempts: 7, .. }
    ));
}

#[test]
fn test_refill_survives_extreme_interval_bounds() {
    // Bounds near u32::MAX satisfy the settings invariants but have no
    // representable fire date; the batch must collect an error for the
    // post instead of panicking.
    let mut post = sample_post(1);
    post.recycle.min_interval_days = 3_000_000_000;
    post.recycle.max_interval_days = 4_000_000_000;
    post.schedule.last_posted_at = Some(noon(2026, 3, 1));
    let healthy = sample_post(2);
    let config = SchedulerConfig::default();

    let (entries, errors) = queue::refill_queue(
        &[post, healthy],
        &[],
        noon(2026, 3, 2),
        &config,
        &mut rng(7),
    );

    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], SchedulerError::InvalidInterval { .. }));
    // The healthy post still got scheduled.
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].post_id, PostId::new(2));
}

struct StubPublisher {
    calls: Mutex<Vec<PublishRequest>>,
    fail_with: Option<String>,
}

impl StubPublisher {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_with: None,
        })
    }

    fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_with: Some(reason.to_string()),
        })
    }

    fn calls(&self) -> Vec<PublishRequest> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Publisher for StubPublisher {
    async fn publish(&self, request: PublishRequest) -> Result<PublishReceipt, String> {
        self.calls.lock().push(request);
        match &self.fail_with {
            Some(reason) => Err(reason.clone()),
            None => Ok(PublishReceipt {
                posted_at: Utc::now(),
            }),
        }
    }
}

struct StalledPublisher;

#[async_trait]
impl Publisher for StalledPublisher {
    async fn publish(&self, _request: PublishRequest) -> Result<PublishReceipt, String> {
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        Ok(PublishReceipt {
            posted_at: Utc::now(),
        })
    }
}

fn seeded_catalog(post: EvergreenPost) -> Catalog {
    let catalog = Catalog::new();
    catalog.insert_post(post).unwrap();
    catalog
}

#[tokio::test]
async fn test_tick_fires_due_entry_and_requeues() {
    let catalog = seeded_catalog(sample_post(1));
    let publisher = StubPublisher::ok();
    let mut engine = SchedulerEngine::with_seed(
        catalog.clone(),
        publisher.clone(),
        SchedulerConfig::default(),
        7,
    );
    let now = noon(2026, 3, 2);

    // First tick only seeds the queue: never-posted posts fire at once.
    let report = engine.tick(now).await;
    assert_eq!(report.entries_added, 1);
    assert!(report.posted.is_empty());

    let report = engine.tick(now).await;
    assert!(report.is_clean());
    assert_eq!(report.posted.len(), 1);
    assert_eq!(report.posted[0].status, QueueStatus::Posted);

    let calls = publisher.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].variation_index, -1);
    assert_eq!(calls[0].content, "Ship early, ship often.");

    let post = catalog.post(PostId::new(1)).unwrap();
    assert_eq!(post.recycle.current_recycles, 1);
    assert_eq!(post.schedule.last_posted_at, Some(now));
    // The same tick already queued the next occurrence.
    assert_eq!(report.entries_added, 1);
    assert!(post.schedule.next_post_at.is_some());
}

#[tokio::test]
async fn test_tick_skips_paused_post_at_fire_time() {
    let catalog = seeded_catalog(sample_post(1));
    let publisher = StubPublisher::ok();
    let mut engine = SchedulerEngine::with_seed(
        catalog.clone(),
        publisher.clone(),
        SchedulerConfig::default(),
        7,
    );
    let now = noon(2026, 3, 2);

    engine.tick(now).await;
    catalog.pause(PostId::new(1)).unwrap();

    let report = engine.tick(now).await;
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].status, QueueStatus::Skipped);
    assert!(report.skipped[0]
        .reason
        .as_deref()
        .unwrap()
        .contains("paused"));
    assert!(publisher.calls().is_empty());

    // A skipped occurrence is not a recycle.
    let post = catalog.post(PostId::new(1)).unwrap();
    assert_eq!(post.recycle.current_recycles, 0);
    assert!(post.schedule.last_posted_at.is_none());
}

#[tokio::test]
async fn test_tick_marks_failed_on_publisher_error() {
    let catalog = seeded_catalog(sample_post(1));
    let publisher = StubPublisher::failing("rate limited");
    let mut engine = SchedulerEngine::with_seed(
        catalog.clone(),
        publisher.clone(),
        SchedulerConfig::default(),
        7,
    );
    let now = noon(2026, 3, 2);

    engine.tick(now).await;
    let report = engine.tick(now).await;

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].status, QueueStatus::Failed);
    assert_eq!(report.failed[0].reason.as_deref(), Some("rate limited"));
    assert!(!report.is_clean());

    // Failures never consume a recycle or move the timing state.
    let post = catalog.post(PostId::new(1)).unwrap();
    assert_eq!(post.recycle.current_recycles, 0);
    assert!(post.schedule.last_posted_at.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_tick_times_out_stalled_publisher() {
    let catalog = seeded_catalog(sample_post(1));
    let mut engine = SchedulerEngine::with_seed(
        catalog.clone(),
        Arc::new(StalledPublisher),
        SchedulerConfig::default(),
        7,
    );
    let now = noon(2026, 3, 2);

    engine.tick(now).await;
    let report = engine.tick(now).await;

    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0]
        .reason
        .as_deref()
        .unwrap()
        .contains("Publish timeout"));
    assert_eq!(
        catalog.post(PostId::new(1)).unwrap().recycle.current_recycles,
        0
    );
}

#[tokio::test]
async fn test_tick_expires_post_at_max_recycles() {
    let mut post = sample_post(1);
    post.recycle.max_recycles = 1;
    let catalog = seeded_catalog(post);
    let mut engine = SchedulerEngine::with_seed(
        catalog.clone(),
        StubPublisher::ok(),
        SchedulerConfig::default(),
        7,
    );
    let now = noon(2026, 3, 2);

    engine.tick(now).await;
    let report = engine.tick(now).await;

    assert_eq!(report.posted.len(), 1);
    assert_eq!(report.expired_posts, vec![PostId::new(1)]);
    // Expired posts never re-enter the queue.
    assert_eq!(report.entries_added, 0);

    let post = catalog.post(PostId::new(1)).unwrap();
    assert_eq!(post.status, PostStatus::Expired);
}

#[tokio::test]
async fn test_tick_collects_stale_resolved_entries() {
    let catalog = seeded_catalog(sample_post(1));
    let config = SchedulerConfig::default();
    let mut engine =
        SchedulerEngine::with_seed(catalog.clone(), StubPublisher::ok(), config.clone(), 7);
    let now = noon(2026, 3, 2);

    engine.tick(now).await;
    engine.tick(now).await;

    // Resolved history survives inside the retention window.
    let later = now + Duration::days(config.queue_retention_days as i64 - 1);
    let report = engine.tick(later).await;
    assert_eq!(report.entries_collected, 0);

    let much_later = now + Duration::days(config.queue_retention_days as i64 + 1);
    let report = engine.tick(much_later).await;
    assert_eq!(report.entries_collected, 1);
}
