//! # Evergreen Recycling Scheduler
//!
//! Scheduling engine for re-publishing evergreen social content.
//!
//! This crate decides when, with which content variation, and on which
//! platform a reusable post is published again. It keeps an in-memory
//! catalog of posts and a forward-looking recycle queue, and exposes a
//! single periodic `tick` that fires due entries through a pluggable
//! publisher, folds outcomes back into post state, and tops the queue up.
//!
//! ## Features
//!
//! - **Interval policy**: spacing between recycles bounded per post, with
//!   deterministic or randomized placement inside the bounds
//! - **Variation rotation**: alternate content bodies cycle so the same
//!   text never runs twice in a row, with an optional performance bias
//! - **Duplicate-day guard**: no two occurrences of a post on the same
//!   local calendar day, resolved by bounded one-day shifts
//! - **Lifecycle management**: pause, resume, and expiry by recycle cap
//!   or sustained low engagement
//! - **Timezone-aware**: all calendar-day math runs in the post's own
//!   IANA timezone
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: core data types shared across the crate
//! - [`models`]: catalog ingestion, validation, and timezone math
//! - [`catalog`]: in-memory post and queue store
//! - [`scheduler`]: interval, variation, duplicate, lifecycle, and queue
//!   policies, plus the engine that drives them
//! - [`services`]: collaborator seams (outbound publisher, inbound
//!   analytics)

pub mod api;
pub mod catalog;
pub mod models;
pub mod scheduler;
pub mod services;
