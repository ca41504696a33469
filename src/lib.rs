//! Filtering and academic metrics for the campus dashboard views.
//!
//! Views hand an already-loaded collection to [`filter::filter`] on every
//! query change, and grades or attendance events to the [`metrics`]
//! aggregators whenever the collection changes. Both are pure functions.

pub mod config;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod report;
pub mod telemetry;

pub use filter::{filter, FavoriteIds, FilterConstraints, SearchFields, Searchable};
pub use metrics::{
    aggregate_attendance, aggregate_grades, AttendanceStatistics, GradeStatistics, MetricsError,
};
pub use models::{Record, RecordKind};
