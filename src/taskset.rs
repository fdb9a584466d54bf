//! Deadline-monotonic task sets and their time-demand queries.
//!
//! A [`TaskSet`] keeps its tasks sorted by ascending relative deadline at
//! all times; a task's index in that sequence *is* its fixed priority
//! (index 0 = highest). The set also owns the mutexes shared between its
//! tasks and answers the two aggregate queries the feasibility test is
//! built from: worst-case blocking time and the Lehoczky time-demand
//! function.

use std::fmt;

use crate::locking::Mutex;
use crate::models::Task;

/// Errors raised by task-set queries and mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSetError {
    /// A lookup named a task that is not a member of the set.
    TaskNotFound(String),
    /// A mutex under insertion references a task name absent from the set.
    UnknownParticipant(String),
}

impl fmt::Display for TaskSetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TaskNotFound(name) => write!(f, "No task with name {name:?} in task set"),
            Self::UnknownParticipant(name) => {
                write!(f, "Mutex references unknown task {name:?}")
            }
        }
    }
}

impl std::error::Error for TaskSetError {}

/// An ordered collection of tasks plus the mutexes they share.
#[derive(Clone, Debug, Default)]
pub struct TaskSet {
    name: String,
    // Sorted by ascending deadline; index = priority.
    tasks: Vec<Task>,
    mutexes: Vec<Mutex>,
}

impl TaskSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: Vec::new(),
            mutexes: Vec::new(),
        }
    }

    /// Build and populate a set from some tasks.
    pub fn from_tasks(name: impl Into<String>, tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut set = Self::new(name);
        for task in tasks {
            set.add_task(task);
        }
        set
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tasks in priority order (index 0 = highest priority).
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn mutexes(&self) -> &[Mutex] {
        &self.mutexes
    }

    /// Insert a task, re-establishing deadline-monotonic order.
    ///
    /// The sort is stable, so tasks with equal deadlines keep their
    /// relative insertion order. Insertions are rare (sets are built once
    /// from configuration), so a full re-sort per insertion is fine.
    pub fn add_task(&mut self, task: Task) {
        self.tasks.push(task);
        self.tasks.sort_by_key(|t| t.deadline);
    }

    /// Append a mutex, verifying every participant resolves to a task
    /// already present in the set. Tasks are never removed, so the check
    /// holds for the lifetime of the set.
    pub fn add_mutex(&mut self, mutex: Mutex) -> Result<(), TaskSetError> {
        for (name, _) in mutex.participants() {
            if self.index_of_name(name).is_none() {
                return Err(TaskSetError::UnknownParticipant(name.to_string()));
            }
        }
        self.mutexes.push(mutex);
        Ok(())
    }

    /// Exact-match lookup by task name.
    pub fn get_task_by_name(&self, name: &str) -> Result<&Task, TaskSetError> {
        self.tasks
            .iter()
            .find(|t| t.name.as_deref() == Some(name))
            .ok_or_else(|| TaskSetError::TaskNotFound(name.to_string()))
    }

    /// Priority index of the named task, if present.
    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        self.tasks
            .iter()
            .position(|t| t.name.as_deref() == Some(name))
    }

    /// Priority of a task, i.e. its index in the ordered sequence.
    pub fn priority_of(&self, task: &Task) -> Result<usize, TaskSetError> {
        self.tasks
            .iter()
            .position(|t| t == task)
            .ok_or_else(|| TaskSetError::TaskNotFound(describe(task)))
    }

    /// Worst-case blocking for the task at priority `idx`: the maximum
    /// priority inversion across all mutexes, 0 when there are none.
    ///
    /// The maximum (not the sum) models the assumption that a task is
    /// blocked by at most one critical section at a time.
    pub fn blocking_time_at(&self, idx: usize) -> u64 {
        self.mutexes
            .iter()
            .map(|m| m.policy().worst_case_inversion(m, self, idx))
            .max()
            .unwrap_or(0)
    }

    /// [`blocking_time_at`](Self::blocking_time_at) with task lookup.
    pub fn blocking_time(&self, task: &Task) -> Result<u64, TaskSetError> {
        Ok(self.blocking_time_at(self.priority_of(task)?))
    }

    /// Cumulative interference through priority `idx` at elapsed time `t`:
    /// `sum over j <= idx of ceil(t / period_j) * execution_time_j`.
    ///
    /// This is the demand of the task at `idx` plus the preemption it
    /// suffers from every higher-priority task, without any blocking
    /// term. Blocking is added once by [`TimeDemand::eval`], at the level
    /// of the task under analysis only.
    fn interference_at(&self, idx: usize, t: u64) -> u64 {
        self.tasks[..=idx]
            .iter()
            .map(|task| t.div_ceil(task.period) * task.execution_time)
            .sum()
    }

    /// Time-demand function of the task at priority `idx`.
    ///
    /// Panics if `idx` is out of range.
    pub fn time_demand_at(&self, idx: usize) -> TimeDemand<'_> {
        assert!(idx < self.tasks.len(), "priority index out of range");
        TimeDemand { set: self, idx }
    }

    /// Time-demand function for `task`, which must be a member of the set.
    pub fn time_demand(&self, task: &Task) -> Result<TimeDemand<'_>, TaskSetError> {
        Ok(self.time_demand_at(self.priority_of(task)?))
    }

    /// Sum of per-task utilizations.
    pub fn total_utilization(&self) -> f64 {
        self.tasks.iter().map(Task::utilization).sum()
    }
}

fn describe(task: &Task) -> String {
    task.name
        .clone()
        .unwrap_or_else(|| format!("<unnamed {task}>"))
}

/// The time-demand function `W_i(t)` of one task, exposed as a callable
/// over the numeric domain for the checker and for curve export.
///
/// `W_i(t) = ceil(t/p_i)*e_i + interference of all higher-priority tasks
/// + blocking_time(i)`, where the interference terms carry no blocking of
/// their own.
#[derive(Clone, Copy)]
pub struct TimeDemand<'a> {
    set: &'a TaskSet,
    idx: usize,
}

impl TimeDemand<'_> {
    /// The task this demand function belongs to.
    pub fn task(&self) -> &Task {
        &self.set.tasks()[self.idx]
    }

    /// The task's priority index.
    pub fn priority(&self) -> usize {
        self.idx
    }

    /// Evaluate cumulative demand at elapsed time `t`.
    pub fn eval(&self, t: u64) -> u64 {
        self.set.interference_at(self.idx, t) + self.set.blocking_time_at(self.idx)
    }
}
