//! Text report generation.
//!
//! Renders a task-set summary (utilization and blocking per task, in
//! priority order) and the schedulability verdict. Everything writes
//! into a generic [`io::Write`] so tests and callers can capture or
//! redirect the output.

use std::io::{self, Write};

use crate::analysis::Verdict;
use crate::taskset::TaskSet;

/// Write the banner announcing a task set.
pub fn write_banner<W: Write>(set: &TaskSet, out: &mut W) -> io::Result<()> {
    let rule = "*".repeat(80);
    writeln!(out, "{rule}")?;
    writeln!(out, "* TASK SET: {}", set.name())?;
    writeln!(out, "{rule}")
}

/// Write the per-task report: utilization and worst-case blocking time
/// for every task, highest priority first.
pub fn write_report<W: Write>(set: &TaskSet, out: &mut W) -> io::Result<()> {
    writeln!(out, "== Task Set Report ==")?;
    writeln!(out, "Task Set Utilization: {:.2}", set.total_utilization())?;
    writeln!(out, "Tasks (priority ordered):")?;
    for (idx, task) in set.tasks().iter().enumerate() {
        writeln!(out, " - p{:02}: {task}", idx + 1)?;
        writeln!(out, "     utilization   - {:.2}", task.utilization())?;
        writeln!(out, "     blocking time - {}", set.blocking_time_at(idx))?;
    }
    Ok(())
}

/// Write the schedulability verdict produced by the checker.
pub fn write_verdict<W: Write>(set: &TaskSet, verdict: &Verdict, out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "== Schedulability Analysis ==")?;
    if verdict.schedulable() {
        writeln!(out, "All tasks could be feasibly scheduled!")
    } else {
        writeln!(out, "Not Schedulable!")?;
        writeln!(out, "The following tasks are at risk of missing deadlines:")?;
        for &idx in &verdict.not_schedulable {
            writeln!(out, " - {}", set.tasks()[idx])?;
        }
        Ok(())
    }
}
