//! Recycling scheduler core.
//!
//! This module decides when, with which variation, and on which platform
//! an evergreen post is re-published. The pieces compose bottom-up:
//! interval and variation policies feed the queue refill pass, the
//! lifecycle rules govern status changes, and [`engine::SchedulerEngine`]
//! ties them together into the periodic `tick` loop.

pub mod config;
pub mod duplicate;
pub mod engine;
pub mod error;
pub mod interval;
pub mod lifecycle;
pub mod queue;
pub mod variation;

pub use config::SchedulerConfig;
pub use engine::{SchedulerEngine, TickError, TickReport};
pub use error::{SchedulerError, SchedulerResult};

#[cfg(test)]
mod tests;
