//! Contribution aggregation: time filtering, deduplication and per-category summaries.

pub mod builder;
pub mod event;
pub mod merge;
pub mod window;

pub use builder::{Category, Synopsis, SynopsisBuilder};
pub use event::{Actor, Timestamped, TimestampedEvent};
pub use merge::{contributors, merge_contributions, merge_sequences, ContributorRecord};
pub use window::{parse_boundary, time_filter, TimeWindow};
