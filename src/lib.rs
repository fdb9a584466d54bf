//! Offline schedulability analysis for fixed-priority periodic task sets.
//!
//! Determines whether a set of periodic real-time tasks, scheduled
//! preemptively with deadline-monotonic fixed priorities, can meet all
//! deadlines — accounting for priority inversion caused by shared
//! mutual-exclusion resources. The feasibility test is Lehoczky-style
//! time-demand analysis: a fixed-point search for a point at or before
//! each task's deadline where cumulative demand no longer exceeds
//! elapsed time.
//!
//! This is a design-time analysis tool, not a runtime scheduler: the
//! core is purely computational, single-threaded and deterministic over
//! an immutable [`TaskSet`].
//!
//! ```
//! use schedcheck::{analysis, Task, TaskSet};
//!
//! let set = TaskSet::from_tasks(
//!     "example",
//!     [
//!         Task::new(5, 1, None, Some("control".into())),
//!         Task::new(20, 4, None, Some("logger".into())),
//!     ],
//! );
//! let verdict = analysis::check_task_set(&set, 0);
//! assert!(verdict.schedulable());
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod curve;
pub mod locking;
pub mod logging;
pub mod models;
pub mod report;
pub mod taskset;

pub use analysis::{check_task_set, Verdict};
pub use config::ConfigError;
pub use locking::{LockingPolicy, Mutex};
pub use models::Task;
pub use taskset::{TaskSet, TaskSetError, TimeDemand};
