//! Timeline CLI command
//!
//! Renders the computed layout as one row per scheduled task, one text
//! column per day. JSON mode emits the layout itself (window, day width,
//! positioned bars) for machine consumers.

use anyhow::Result;
use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};

use super::output::Output;
use super::parse_date;
use crate::schedule::{
    layout_ordered, shift_anchor, BarOrder, NavDirection, TaskBar, TimelineWindow, ZoomLevel,
};
use crate::storage::{TaskRepository, Workspace};

pub fn render(
    output: &Output,
    zoom_str: Option<&str>,
    date_str: Option<&str>,
    order_str: &str,
    go_str: Option<&str>,
) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let store = workspace.task_store();

    let zoom = match zoom_str {
        Some(raw) => raw.parse::<ZoomLevel>().map_err(|e| anyhow::anyhow!(e))?,
        None => workspace.config().workspace.default_zoom,
    };
    let order: BarOrder = order_str.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let today = Local::now().date_naive();
    let mut anchor = match date_str {
        Some(raw) => parse_date(raw)?,
        None => today,
    };
    if let Some(raw) = go_str {
        let direction: NavDirection = raw.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        anchor = shift_anchor(anchor, zoom, direction);
    }

    let tasks = store.all()?;
    let unscheduled = tasks.iter().filter(|t| !t.has_schedule()).count();
    let layout = layout_ordered(&tasks, zoom, anchor, order);

    output.verbose_ctx(
        "timeline",
        &format!(
            "{} zoom, window {} .. {}, {} bar(s)",
            layout.zoom,
            layout.window.start,
            layout.window.end(),
            layout.bars.len()
        ),
    );

    if output.is_json() {
        output.data(&layout);
        return Ok(());
    }

    let last = layout.window.end() - Duration::days(1);
    println!(
        "Timeline ({}): {} .. {} ({} days)",
        layout.zoom, layout.window.start, last, layout.window.days
    );
    println!();

    if layout.bars.is_empty() {
        println!("No scheduled tasks in this workspace.");
    } else {
        println!("{:<12} {:<22} {}", "", "", ruler(&layout.window, today));
        for bar in &layout.bars {
            println!(
                "{:<12} {:<22} {}",
                bar.task,
                truncate(&bar.title, 20),
                track(bar, &layout.window)
            );
        }
    }

    if unscheduled > 0 {
        println!();
        println!("{} unscheduled task(s) not shown.", unscheduled);
    }

    Ok(())
}

/// One char per day: `|` on Mondays, `*` on today, `.` elsewhere
fn ruler(window: &TimelineWindow, today: NaiveDate) -> String {
    window
        .dates()
        .map(|date| {
            if date == today {
                '*'
            } else if date.weekday() == Weekday::Mon {
                '|'
            } else {
                '.'
            }
        })
        .collect()
}

/// Bar row: `=` across the task's days, `*` for milestones
///
/// A bar entirely outside the window renders as a direction marker so
/// the row still says where the task went.
fn track(bar: &TaskBar, window: &TimelineWindow) -> String {
    if bar.start >= window.end() {
        return "->".to_string();
    }
    if bar.end < window.start {
        return "<-".to_string();
    }

    let glyph = if bar.kind.is_milestone() { '*' } else { '=' };
    window
        .dates()
        .map(|date| {
            if date >= bar.start && date <= bar.end {
                glyph
            } else {
                ' '
            }
        })
        .collect()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max - 3).collect();
        format!("{}...", cut)
    }
}
