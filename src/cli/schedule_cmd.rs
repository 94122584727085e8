//! Reschedule CLI command
//!
//! Wraps the cascading reschedule: the named task's due date moves and
//! every transitive dependent is re-dated after it. A partially blocked
//! cascade still reports what moved, then fails with the aggregate
//! constraint report; the applied updates stay committed.

use anyhow::Result;

use super::output::Output;
use super::parse_date;
use crate::domain::TaskId;
use crate::schedule::{CascadeError, Cascader, Rescheduled};
use crate::storage::Workspace;

pub fn reschedule(
    output: &Output,
    id_str: &str,
    due_str: &str,
    depth: Option<usize>,
) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let mut store = workspace.task_store();

    let id: TaskId = id_str.parse()?;
    let new_due = parse_date(due_str)?;
    let max_depth = depth.unwrap_or(workspace.config().workspace.cascade_depth);

    output.verbose_ctx(
        "reschedule",
        &format!("Moving {} to {} (max depth {})", id, new_due, max_depth),
    );

    let result = Cascader::with_max_depth(&mut store, max_depth).reschedule(&id, new_due);

    match result {
        Ok(applied) => {
            if output.is_json() {
                output.data(&serde_json::json!({
                    "task": id.to_string(),
                    "new_due": new_due,
                    "applied": applied,
                }));
            } else {
                output.success(&format!("Rescheduled {} to end {}", id, new_due));
                print_applied(&applied);
            }
            Ok(())
        }
        Err(CascadeError::Blocked(report)) => {
            // Partial success: show what moved, then fail with the report
            if output.is_json() {
                output.data(&serde_json::json!({
                    "task": id.to_string(),
                    "new_due": new_due,
                    "applied": report.applied,
                    "failures": report.failures,
                }));
            } else {
                output.success(&format!("Rescheduled {} to end {}", id, new_due));
                print_applied(&report.applied);
                output.blank();
            }
            Err(CascadeError::Blocked(report).into())
        }
        Err(err) => Err(err.into()),
    }
}

fn print_applied(applied: &[Rescheduled]) {
    for change in applied {
        let old = match (change.old_start, change.old_due) {
            (Some(start), Some(due)) => format!("{} - {}", start, due),
            (Some(start), None) => format!("{} - ?", start),
            (None, Some(due)) => format!("? - {}", due),
            (None, None) => "unscheduled".to_string(),
        };
        println!(
            "  {} '{}': {} -> {} - {}",
            change.task, change.title, old, change.new_start, change.new_due
        );
    }
}
