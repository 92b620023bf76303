//! Owned, encapsulated store for posts and the recycle queue.
//!
//! The catalog replaces module-level shared state with an explicit handle:
//! callers pass and receive `Catalog` clones (cheap `Arc` copies), and the
//! scheduler engine is the only writer of scheduling state. The authoring,
//! analytics, and presentation collaborators go through the dedicated
//! entry points here.

pub mod filter;
pub mod store;

pub use filter::{PostFilter, QueueFilter};
pub use store::Catalog;
