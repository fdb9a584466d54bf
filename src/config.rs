//! Task-definition file loading.
//!
//! Task sets are described in YAML:
//!
//! ```yaml
//! name: my_workload
//! tasks:
//!   control_loop:
//!     period: 10
//!     execution_time: 4
//!     deadline: 8          # optional, defaults to period
//! mutexes:
//!   sensor_bus:
//!     method: priority_inheritance   # or no_interrupt
//!     tasks:
//!       control_loop:
//!         cs_duration: 2
//! ```
//!
//! Every configuration error (missing field, non-positive duration,
//! unknown locking strategy, mutex naming an unknown task) is surfaced
//! here, before any analysis runs; a task set that loads successfully is
//! fully consistent.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::locking::{LockingPolicy, Mutex};
use crate::models::Task;
use crate::taskset::{TaskSet, TaskSetError};

/// Errors surfaced while loading a task-definition file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read task definitions")]
    Io(#[from] io::Error),
    #[error("invalid task definition document")]
    Yaml(#[from] serde_yaml::Error),
    #[error("task {task:?}: {field} must be positive")]
    NonPositive { task: String, field: &'static str },
    #[error("mutex {mutex:?}: unknown locking strategy {identifier:?}")]
    UnknownLockingStrategy { mutex: String, identifier: String },
    #[error("mutex {mutex:?}: references unknown task {task:?}")]
    UnknownTask { mutex: String, task: String },
    #[error("mutex {mutex:?}, task {task:?}: cs_duration must be positive")]
    NonPositiveCsDuration { mutex: String, task: String },
}

#[derive(Debug, Deserialize)]
struct TaskSetDoc {
    name: Option<String>,
    #[serde(default)]
    tasks: BTreeMap<String, TaskDoc>,
    #[serde(default)]
    mutexes: BTreeMap<String, MutexDoc>,
}

#[derive(Debug, Deserialize)]
struct TaskDoc {
    period: u64,
    execution_time: u64,
    deadline: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct MutexDoc {
    method: String,
    #[serde(default)]
    tasks: BTreeMap<String, MutexTaskDoc>,
}

#[derive(Debug, Deserialize)]
struct MutexTaskDoc {
    cs_duration: u64,
}

/// Load a task set from a YAML file. A missing top-level `name` defaults
/// to the file stem.
pub fn load_path(path: &Path) -> Result<TaskSet, ConfigError> {
    let source = fs::read_to_string(path)?;
    let fallback = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Unnamed Task Set".to_string());
    from_str(&source, &fallback)
}

/// Parse and validate a task set from YAML text, using `default_name`
/// when the document carries no `name` field.
pub fn from_str(source: &str, default_name: &str) -> Result<TaskSet, ConfigError> {
    let doc: TaskSetDoc = serde_yaml::from_str(source)?;
    let name = doc.name.unwrap_or_else(|| default_name.to_string());
    let mut set = TaskSet::new(name);

    for (task_name, task_doc) in doc.tasks {
        require_positive(task_doc.period, &task_name, "period")?;
        require_positive(task_doc.execution_time, &task_name, "execution_time")?;
        if let Some(deadline) = task_doc.deadline {
            require_positive(deadline, &task_name, "deadline")?;
        }
        set.add_task(Task::new(
            task_doc.period,
            task_doc.execution_time,
            task_doc.deadline,
            Some(task_name),
        ));
    }

    for (mutex_name, mutex_doc) in doc.mutexes {
        let policy = LockingPolicy::from_identifier(&mutex_doc.method).ok_or_else(|| {
            ConfigError::UnknownLockingStrategy {
                mutex: mutex_name.clone(),
                identifier: mutex_doc.method.clone(),
            }
        })?;
        let mut participants = FxHashMap::default();
        for (task_name, info) in mutex_doc.tasks {
            if info.cs_duration == 0 {
                return Err(ConfigError::NonPositiveCsDuration {
                    mutex: mutex_name.clone(),
                    task: task_name,
                });
            }
            participants.insert(task_name, info.cs_duration);
        }
        set.add_mutex(Mutex::new(policy, participants))
            .map_err(|err| match err {
                TaskSetError::UnknownParticipant(task) | TaskSetError::TaskNotFound(task) => {
                    ConfigError::UnknownTask {
                        mutex: mutex_name,
                        task,
                    }
                }
            })?;
    }

    Ok(set)
}

fn require_positive(value: u64, task: &str, field: &'static str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::NonPositive {
            task: task.to_string(),
            field,
        });
    }
    Ok(())
}
