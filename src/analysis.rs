//! Time-demand schedulability analysis (Lehoczky method).
//!
//! For each task we search for some time point `t` at or before the
//! task's deadline where the cumulative time demand `W(t)` (own work,
//! higher-priority interference, worst-case blocking) no longer exceeds
//! the elapsed time. If such a point exists the task provably meets its
//! deadline under fixed-priority preemptive scheduling; if the search
//! runs past the deadline it does not.

use crate::taskset::TaskSet;
use crate::{log_checks, log_debug};

/// Verdict for one whole task set.
///
/// Re-running the analysis on an unchanged set always yields the same
/// verdict; the computation is a pure function of the set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    /// Priority indices of tasks that are not provably schedulable, in
    /// priority order. Empty means every task passed.
    pub not_schedulable: Vec<usize>,
}

impl Verdict {
    /// Whether every task in the set passed the feasibility test.
    pub fn schedulable(&self) -> bool {
        self.not_schedulable.is_empty()
    }
}

/// Run the time-demand feasibility test on every task in `set`.
///
/// Per task at priority `i`: start the trial point at `t =
/// execution_time_i`, evaluate `w = W_i(t)`, accept as feasible when
/// `w <= t`, otherwise jump to `t = w` and retry. The search stops the
/// first time `t` exceeds the deadline. `W_i` is non-decreasing and the
/// range is bounded by the deadline, so the loop always terminates.
///
/// A degenerate task with `execution_time > deadline` starts past its
/// deadline and is reported not schedulable without a special case.
pub fn check_task_set(set: &TaskSet, verbosity: u8) -> Verdict {
    let mut not_schedulable = Vec::new();
    for (idx, task) in set.tasks().iter().enumerate() {
        let demand = set.time_demand_at(idx);
        let mut feasible = false;
        let mut t = task.execution_time;
        while t <= task.deadline {
            let w = demand.eval(t);
            log_debug!(verbosity, "  p{:02}: trial t={} -> W(t)={}", idx + 1, t, w);
            if w <= t {
                feasible = true;
                break;
            }
            t = w;
        }
        log_checks!(
            verbosity,
            "p{:02}: {} -> {}",
            idx + 1,
            task,
            if feasible { "feasible" } else { "NOT schedulable" }
        );
        if !feasible {
            not_schedulable.push(idx);
        }
    }
    Verdict { not_schedulable }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locking::{LockingPolicy, Mutex};
    use crate::models::Task;
    use rustc_hash::FxHashMap;

    fn named_task(name: &str, period: u64, execution_time: u64) -> Task {
        Task::new(period, execution_time, None, Some(name.to_string()))
    }

    #[test]
    fn test_single_task_without_mutexes_is_schedulable() {
        // W(4) = 4 <= 4 on the first trial.
        let set = TaskSet::from_tasks("single", [named_task("only", 10, 4)]);
        let verdict = check_task_set(&set, 0);
        assert!(verdict.schedulable());
        assert!(verdict.not_schedulable.is_empty());
    }

    #[test]
    fn test_overloaded_pair_is_not_schedulable() {
        // Second task: W(8)=14, W(14)=17, W(17)=20; 17 and 20 both exceed
        // the deadline of 10, so the search gives up.
        let set = TaskSet::from_tasks(
            "overloaded",
            [named_task("fast", 5, 3), named_task("slow", 10, 8)],
        );
        let verdict = check_task_set(&set, 0);
        assert!(!verdict.schedulable());
        assert_eq!(verdict.not_schedulable, vec![1]);
    }

    #[test]
    fn test_feasible_pair_passes() {
        // Low task: W(5)=ceil(5/5)*3+5=8 > 5, W(8)=ceil(8/5)*3+5=11 > 8,
        // W(11)=ceil(11/5)*3+5=14 > 11, W(14)=14 <= 14 within D=20.
        let set = TaskSet::from_tasks(
            "feasible",
            [named_task("fast", 5, 3), named_task("slow", 20, 5)],
        );
        let verdict = check_task_set(&set, 0);
        assert!(verdict.schedulable());
    }

    #[test]
    fn test_blocking_can_break_feasibility() {
        // Alone, `high` needs only t=1. A lower-priority critical section
        // of 5 under DisableInterrupts pushes W(t) to t+5 for t <= 5,
        // then past the deadline of 5.
        let mut set = TaskSet::from_tasks(
            "blocked",
            [named_task("high", 5, 1), named_task("low", 40, 4)],
        );
        let participants: FxHashMap<String, u64> =
            [("low".to_string(), 5u64)].into_iter().collect();
        set.add_mutex(Mutex::new(LockingPolicy::DisableInterrupts, participants))
            .unwrap();
        let verdict = check_task_set(&set, 0);
        assert_eq!(verdict.not_schedulable, vec![0]);
    }

    #[test]
    fn test_priority_inheritance_spares_the_same_set() {
        // Same workload as above, but `high` does not participate in the
        // mutex; under priority inheritance it is never blocked.
        let mut set = TaskSet::from_tasks(
            "spared",
            [named_task("high", 5, 1), named_task("low", 40, 4)],
        );
        let participants: FxHashMap<String, u64> =
            [("low".to_string(), 5u64)].into_iter().collect();
        set.add_mutex(Mutex::new(LockingPolicy::PriorityInheritance, participants))
            .unwrap();
        let verdict = check_task_set(&set, 0);
        assert!(verdict.schedulable());
    }

    #[test]
    fn test_degenerate_execution_beyond_deadline() {
        // e=6 > D=5: the trial point starts past the deadline, so the
        // loop body never runs and the task is reported infeasible.
        let set = TaskSet::from_tasks(
            "degenerate",
            [Task::new(10, 6, Some(5), Some("tight".to_string()))],
        );
        let verdict = check_task_set(&set, 0);
        assert_eq!(verdict.not_schedulable, vec![0]);
    }

    #[test]
    fn test_verdict_is_idempotent() {
        let set = TaskSet::from_tasks(
            "repeat",
            [named_task("fast", 5, 3), named_task("slow", 10, 8)],
        );
        let first = check_task_set(&set, 0);
        let second = check_task_set(&set, 0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_set_is_trivially_schedulable() {
        let set = TaskSet::new("empty");
        assert!(check_task_set(&set, 0).schedulable());
    }
}
