//! Timeline layout
//!
//! Pure mapping from `(tasks, zoom, anchor)` to a renderable layout: a
//! visible date window plus one positioned bar per scheduled task. Bars
//! starting before the window clamp to its left edge instead of being
//! dropped, so a wide render always shows every scheduled task.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{Priority, Task, TaskId, TaskKind, TaskStatus};

use super::days_between;

/// Timeline granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ZoomLevel {
    Day,
    #[default]
    Week,
    Month,
}

impl ZoomLevel {
    /// Per-day render width in display units
    pub fn day_width(&self) -> u32 {
        match self {
            ZoomLevel::Day => 120,
            ZoomLevel::Week => 60,
            ZoomLevel::Month => 30,
        }
    }

    /// Days the anchor moves per prev/next navigation step
    pub fn step_days(&self) -> i64 {
        match self {
            ZoomLevel::Day => 7,
            ZoomLevel::Week => 14,
            ZoomLevel::Month => 30,
        }
    }

    /// Computes the visible window for an anchor date
    ///
    /// `Day` starts at the anchor itself and spans a week. `Week` snaps
    /// back to the Monday of the anchor's week and spans four weeks.
    /// `Month` runs from the first of the anchor's month through the end
    /// of the month sixty days on, so its length varies with the calendar.
    pub fn window(&self, anchor: NaiveDate) -> TimelineWindow {
        match self {
            ZoomLevel::Day => TimelineWindow {
                start: anchor,
                days: 7,
            },
            ZoomLevel::Week => {
                let start = anchor - Duration::days(i64::from(anchor.weekday().num_days_from_monday()));
                TimelineWindow { start, days: 28 }
            }
            ZoomLevel::Month => {
                let start = month_start(anchor);
                let end = month_end(start + Duration::days(60));
                TimelineWindow {
                    start,
                    days: days_between(start, end) + 1,
                }
            }
        }
    }
}

impl fmt::Display for ZoomLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ZoomLevel::Day => "day",
            ZoomLevel::Week => "week",
            ZoomLevel::Month => "month",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for ZoomLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(ZoomLevel::Day),
            "week" => Ok(ZoomLevel::Week),
            "month" => Ok(ZoomLevel::Month),
            _ => Err(format!("Invalid zoom '{}' (expected: day, week, month)", s)),
        }
    }
}

/// First day of the month containing `date`
fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

/// Last day of the month containing `date`
fn month_end(date: NaiveDate) -> NaiveDate {
    // From the 1st, 32 days always lands in the following month.
    let into_next = month_start(date) + Duration::days(32);
    month_start(into_next) - Duration::days(1)
}

/// Half-open visible date range `[start, start + days)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineWindow {
    pub start: NaiveDate,
    pub days: i64,
}

impl TimelineWindow {
    /// Exclusive end of the window
    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(self.days)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end()
    }

    /// Every date in the window, in order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.days).map(move |offset| start + Duration::days(offset))
    }
}

/// A positioned task on the timeline
#[derive(Debug, Clone, Serialize)]
pub struct TaskBar {
    pub task: TaskId,
    pub title: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub kind: TaskKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Days from the window start, clamped at zero
    pub start_offset: i64,
    /// Inclusive day count, at least 1
    pub duration: i64,
}

impl TaskBar {
    fn position(task: &Task, window_start: NaiveDate) -> Option<Self> {
        let (start, end) = task.span()?;

        Some(Self {
            task: task.id.clone(),
            title: task.title.clone(),
            status: task.status,
            priority: task.priority,
            kind: task.kind,
            start,
            end,
            start_offset: days_between(window_start, start).max(0),
            duration: task.duration_days(),
        })
    }
}

/// Row ordering for timeline bars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarOrder {
    #[default]
    Start,
    Priority,
    Title,
}

impl FromStr for BarOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" => Ok(BarOrder::Start),
            "priority" => Ok(BarOrder::Priority),
            "title" => Ok(BarOrder::Title),
            _ => Err(format!(
                "Invalid order '{}' (expected: start, priority, title)",
                s
            )),
        }
    }
}

/// Computed timeline for one window
#[derive(Debug, Clone, Serialize)]
pub struct TimelineLayout {
    pub zoom: ZoomLevel,
    pub window: TimelineWindow,
    pub day_width: u32,
    pub bars: Vec<TaskBar>,
}

/// Lays out all scheduled tasks for the window, ordered by start offset
pub fn layout(tasks: &[Task], zoom: ZoomLevel, anchor: NaiveDate) -> TimelineLayout {
    layout_ordered(tasks, zoom, anchor, BarOrder::Start)
}

/// Lays out all scheduled tasks with an explicit row order
///
/// Tasks without any date are skipped. Sorting is stable, so equal keys
/// keep their stored order and repeated runs over the same input produce
/// identical layouts.
pub fn layout_ordered(
    tasks: &[Task],
    zoom: ZoomLevel,
    anchor: NaiveDate,
    order: BarOrder,
) -> TimelineLayout {
    let window = zoom.window(anchor);

    let mut bars: Vec<TaskBar> = tasks
        .iter()
        .filter_map(|task| TaskBar::position(task, window.start))
        .collect();

    match order {
        BarOrder::Start => bars.sort_by_key(|bar| bar.start_offset),
        BarOrder::Priority => bars.sort_by_key(|bar| std::cmp::Reverse(bar.priority.rank())),
        BarOrder::Title => bars.sort_by_key(|bar| bar.title.to_lowercase()),
    }

    TimelineLayout {
        zoom,
        window,
        day_width: zoom.day_width(),
        bars,
    }
}

/// Direction for prev/next window navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Prev,
    Next,
}

impl FromStr for NavDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prev" | "previous" | "back" => Ok(NavDirection::Prev),
            "next" | "forward" => Ok(NavDirection::Next),
            _ => Err(format!("Invalid direction '{}' (expected: prev, next)", s)),
        }
    }
}

/// Moves the anchor one zoom-dependent step in the given direction
pub fn shift_anchor(anchor: NaiveDate, zoom: ZoomLevel, direction: NavDirection) -> NaiveDate {
    let step = Duration::days(zoom.step_days());
    match direction {
        NavDirection::Prev => anchor - step,
        NavDirection::Next => anchor + step,
    }
}
