//! Collaborator seams around the scheduling engine.
//!
//! The scheduler never talks to social networks or computes analytics;
//! it hands publications to a [`publisher::Publisher`] implementation and
//! accepts performance reports through [`analytics`].

pub mod analytics;
pub mod publisher;

pub use analytics::{apply_performance_update, PerformanceUpdate};
pub use publisher::{PublishReceipt, PublishRequest, Publisher};
