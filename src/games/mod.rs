//! Game Reports Module
//!
//! Structured game events and their aggregation:
//! - Event body grammar and ordering
//! - Per-game, per-user sorted store with last-write-wins summaries
//! - JSON events files for the `report` command

pub mod aggregator;
pub mod error;
pub mod event;
pub mod loader;

pub use aggregator::EventAggregator;
pub use error::{AggregateError, AggregateResult, EventError, LoaderError};
pub use event::{compare_events, event_less, GameEvent, HalftimePhase, Updates};
pub use loader::EventsFile;
