//! # Scheduling Layer
//!
//! Date arithmetic over tasks: timeline layout and cascading reschedules.
//!
//! ## Key Types
//!
//! - [`TimelineLayout`] - Positioned bars for a zoom window
//! - [`Cascader`] - Applies a reschedule and ripples it through dependents
//! - [`ZoomLevel`] - Day, week, or month timeline granularity

mod cascade;
mod deps;
mod timeline;

pub use cascade::{
    CascadeError, CascadeFailure, CascadeReport, Cascader, FailureReason, Rescheduled, move_task,
    DEFAULT_MAX_DEPTH,
};
pub use deps::{add_dependency, remove_dependency, DependencyError};
pub use timeline::{
    layout, layout_ordered, shift_anchor, BarOrder, NavDirection, TaskBar, TimelineLayout,
    TimelineWindow, ZoomLevel,
};

use chrono::NaiveDate;

/// Signed number of days from `from` to `to`.
pub(crate) fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}
