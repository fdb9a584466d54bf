//! Mutexes and their locking disciplines.
//!
//! A [`Mutex`] models one shared resource protected by mutual exclusion.
//! The worst-case priority inversion it can inflict on a task depends on
//! the locking discipline the resource uses, so each mutex is bound at
//! construction to one [`LockingPolicy`] variant.
//!
//! Priorities are resolved by name lookup into the owning
//! [`TaskSet`](crate::TaskSet) rather than through stored task pointers,
//! so a mutex never owns or aliases the tasks it refers to.

use rustc_hash::FxHashMap;

use crate::models::Task;
use crate::taskset::{TaskSet, TaskSetError};

/// Locking discipline of a mutex.
///
/// Both variants are stateless policies; the variant chosen decides how
/// much priority inversion a task can suffer from the mutex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockingPolicy {
    /// The resource is held with preemption globally disabled. Any
    /// lower-priority participant can block any task in the set, whether
    /// or not that task uses the resource itself.
    DisableInterrupts,
    /// Classic priority-inheritance locking. Only tasks that themselves
    /// participate in the mutex can be blocked by it.
    PriorityInheritance,
}

impl LockingPolicy {
    /// Registry of configuration identifiers.
    pub const IDENTIFIERS: [(&'static str, LockingPolicy); 2] = [
        ("no_interrupt", LockingPolicy::DisableInterrupts),
        ("priority_inheritance", LockingPolicy::PriorityInheritance),
    ];

    /// Resolve a configuration identifier to a policy.
    ///
    /// Returns `None` for unknown identifiers; the loader turns that into
    /// a configuration error before any analysis runs.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        Self::IDENTIFIERS
            .iter()
            .find(|(id, _)| *id == identifier)
            .map(|(_, policy)| *policy)
    }

    /// The configuration identifier for this policy.
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::DisableInterrupts => "no_interrupt",
            Self::PriorityInheritance => "priority_inheritance",
        }
    }

    /// Worst-case priority inversion the task at priority `task_idx` in
    /// `set` can suffer from `mutex`.
    ///
    /// For `DisableInterrupts` this is the longest critical section among
    /// participants of strictly lower priority (larger index), regardless
    /// of whether the task itself participates. For `PriorityInheritance`
    /// a non-participant is never blocked; a participant gets the same
    /// lower-priority maximum.
    pub(crate) fn worst_case_inversion(&self, mutex: &Mutex, set: &TaskSet, task_idx: usize) -> u64 {
        match self {
            Self::DisableInterrupts => max_lower_priority_cs(mutex, set, task_idx),
            Self::PriorityInheritance => {
                let participates = set.tasks()[task_idx]
                    .name
                    .as_deref()
                    .is_some_and(|name| mutex.participates(name));
                if participates {
                    max_lower_priority_cs(mutex, set, task_idx)
                } else {
                    0
                }
            }
        }
    }
}

/// Longest critical section among participants with strictly lower
/// priority than `task_idx` (i.e. a strictly larger index); 0 if none.
fn max_lower_priority_cs(mutex: &Mutex, set: &TaskSet, task_idx: usize) -> u64 {
    mutex
        .participants
        .iter()
        .filter_map(|(name, &cs)| match set.index_of_name(name) {
            Some(idx) if idx > task_idx => Some(cs),
            _ => None,
        })
        .max()
        .unwrap_or(0)
}

/// One shared resource with its participating tasks and locking policy.
///
/// Participants are keyed by task name; only named tasks can contend for
/// a mutex. [`TaskSet::add_mutex`](crate::TaskSet::add_mutex) verifies at
/// insertion that every participant resolves to a task in the set.
#[derive(Clone, Debug)]
pub struct Mutex {
    participants: FxHashMap<String, u64>,
    policy: LockingPolicy,
}

impl Mutex {
    /// Build a mutex from its policy and `task name -> cs_duration` map.
    pub fn new(policy: LockingPolicy, participants: FxHashMap<String, u64>) -> Self {
        Self {
            participants,
            policy,
        }
    }

    /// The locking discipline bound at construction.
    pub fn policy(&self) -> LockingPolicy {
        self.policy
    }

    /// Iterate over `(task name, cs_duration)` pairs.
    pub fn participants(&self) -> impl Iterator<Item = (&str, u64)> {
        self.participants.iter().map(|(name, &cs)| (name.as_str(), cs))
    }

    /// Whether the named task contends for this mutex.
    pub fn participates(&self, name: &str) -> bool {
        self.participants.contains_key(name)
    }

    /// The task's priority, i.e. its index in the owning set's sequence.
    ///
    /// Fails with [`TaskSetError::TaskNotFound`] if the task is not a
    /// member of `set`.
    pub fn get_priority(&self, set: &TaskSet, task: &Task) -> Result<usize, TaskSetError> {
        set.priority_of(task)
    }

    /// Worst-case priority inversion `task` can suffer from this mutex,
    /// delegated to the bound locking policy.
    pub fn worst_case_priority_inversion(
        &self,
        set: &TaskSet,
        task: &Task,
    ) -> Result<u64, TaskSetError> {
        let idx = set.priority_of(task)?;
        Ok(self.policy.worst_case_inversion(self, set, idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taskset::TaskSet;

    fn named_task(name: &str, period: u64, execution_time: u64) -> Task {
        Task::new(period, execution_time, None, Some(name.to_string()))
    }

    fn participants(entries: &[(&str, u64)]) -> FxHashMap<String, u64> {
        entries
            .iter()
            .map(|(name, cs)| (name.to_string(), *cs))
            .collect()
    }

    /// Two tasks sharing one resource: `high` (deadline 5) outranks `low`
    /// (deadline 20).
    fn two_task_set() -> TaskSet {
        let mut set = TaskSet::new("locking");
        set.add_task(named_task("high", 5, 1));
        set.add_task(named_task("low", 20, 4));
        set
    }

    #[test]
    fn test_identifier_registry_round_trip() {
        for (id, policy) in LockingPolicy::IDENTIFIERS {
            assert_eq!(LockingPolicy::from_identifier(id), Some(policy));
            assert_eq!(policy.identifier(), id);
        }
    }

    #[test]
    fn test_unknown_identifier_rejected() {
        assert_eq!(LockingPolicy::from_identifier("priority_ceiling"), None);
        assert_eq!(LockingPolicy::from_identifier(""), None);
    }

    #[test]
    fn test_disable_interrupts_blocks_by_lower_priority_holder() {
        let set = two_task_set();
        let mutex = Mutex::new(
            LockingPolicy::DisableInterrupts,
            participants(&[("low", 5), ("high", 1)]),
        );
        let high = set.get_task_by_name("high").unwrap();
        let low = set.get_task_by_name("low").unwrap();
        assert_eq!(mutex.worst_case_priority_inversion(&set, high).unwrap(), 5);
        // Nothing runs below the lowest-priority task.
        assert_eq!(mutex.worst_case_priority_inversion(&set, low).unwrap(), 0);
    }

    #[test]
    fn test_disable_interrupts_blocks_non_participant() {
        let mut set = two_task_set();
        set.add_task(named_task("mid", 10, 2));
        let mutex = Mutex::new(
            LockingPolicy::DisableInterrupts,
            participants(&[("low", 5), ("high", 1)]),
        );
        // `mid` never touches the resource but can still be blocked while
        // `low` runs with preemption disabled.
        let mid = set.get_task_by_name("mid").unwrap();
        assert_eq!(mutex.worst_case_priority_inversion(&set, mid).unwrap(), 5);
    }

    #[test]
    fn test_priority_inheritance_spares_non_participant() {
        let mut set = two_task_set();
        set.add_task(named_task("mid", 10, 2));
        let mutex = Mutex::new(
            LockingPolicy::PriorityInheritance,
            participants(&[("low", 5), ("high", 1)]),
        );
        let high = set.get_task_by_name("high").unwrap();
        let mid = set.get_task_by_name("mid").unwrap();
        let low = set.get_task_by_name("low").unwrap();
        assert_eq!(mutex.worst_case_priority_inversion(&set, high).unwrap(), 5);
        assert_eq!(mutex.worst_case_priority_inversion(&set, mid).unwrap(), 0);
        assert_eq!(mutex.worst_case_priority_inversion(&set, low).unwrap(), 0);
    }

    #[test]
    fn test_unnamed_task_cannot_participate() {
        let mut set = TaskSet::new("anon");
        set.add_task(Task::new(5, 1, None, None));
        set.add_task(named_task("low", 20, 4));
        let mutex = Mutex::new(
            LockingPolicy::PriorityInheritance,
            participants(&[("low", 3)]),
        );
        let anon = set.tasks()[0].clone();
        assert_eq!(mutex.worst_case_priority_inversion(&set, &anon).unwrap(), 0);
    }

    #[test]
    fn test_priority_lookup_of_foreign_task_fails() {
        let set = two_task_set();
        let mutex = Mutex::new(LockingPolicy::DisableInterrupts, participants(&[]));
        let stranger = named_task("stranger", 30, 1);
        assert!(matches!(
            mutex.get_priority(&set, &stranger),
            Err(TaskSetError::TaskNotFound(_))
        ));
    }
}
