//! Core data types for the analysis.

use std::fmt;

/// One periodic real-time task.
///
/// All time quantities are in abstract integer ticks; the analysis never
/// interprets them as any particular unit. A task is immutable once built
/// and is owned by exactly one [`TaskSet`](crate::TaskSet).
///
/// Callers must supply strictly positive `period` and `execution_time`;
/// the configuration loader enforces this for file-driven input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    /// Inter-arrival time between successive releases.
    pub period: u64,
    /// Worst-case compute time per release.
    pub execution_time: u64,
    /// Relative deadline from release.
    pub deadline: u64,
    /// Optional identifier, unique within a task set when used for lookup.
    pub name: Option<String>,
}

impl Task {
    /// Build a task. A missing `deadline` defaults to the full period.
    pub fn new(
        period: u64,
        execution_time: u64,
        deadline: Option<u64>,
        name: Option<String>,
    ) -> Self {
        Self {
            period,
            execution_time,
            deadline: deadline.unwrap_or(period),
            name,
        }
    }

    /// Fraction of the processor this task consumes: `execution_time / period`.
    pub fn utilization(&self) -> f64 {
        self.execution_time as f64 / self.period as f64
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task {:?} (p={}, e={}, D={})",
            self.name.as_deref().unwrap_or("<unnamed>"),
            self.period,
            self.execution_time,
            self.deadline
        )
    }
}
