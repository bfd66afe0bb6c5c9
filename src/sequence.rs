use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::mpsc::channel;

use crate::error::{BuildError, TaskError};
use crate::task::Task;

/// A single step of a [`Sequence`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Run one task.
    One(Task),
    /// Start all tasks at once; the step ends when the last one finishes.
    Parallel(Vec<Task>),
}

impl Step {
    pub fn tasks(&self) -> &[Task] {
        match self {
            Step::One(task) => std::slice::from_ref(task),
            Step::Parallel(tasks) => tasks,
        }
    }
}

/// An ordered list of steps. Each step is awaited in full before the next
/// one starts, and the first failure stops the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    steps: Vec<Step>,
}

impl Sequence {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Runs every step in order using `exec` for each task, returning the
    /// outputs in completion order.
    ///
    /// Tasks in a parallel step are spawned on the rayon pool. If any of them
    /// fails, the remaining siblings are still awaited, after which the
    /// failure that arrived first is returned and no later step is started.
    pub fn run<F, O>(&self, exec: &F) -> Result<Vec<O>, BuildError>
    where
        F: Fn(Task) -> Result<O, BuildError> + Sync,
        O: Send,
    {
        let mut outputs = Vec::new();

        for (i, step) in self.steps.iter().enumerate() {
            tracing::debug!(step = i, tasks = ?step.tasks(), "starting step");

            match step {
                Step::One(task) => outputs.push(exec_guarded(exec, *task)?),
                Step::Parallel(tasks) => outputs.extend(run_parallel(exec, tasks)?),
            }
        }

        Ok(outputs)
    }
}

fn run_parallel<F, O>(exec: &F, tasks: &[Task]) -> Result<Vec<O>, BuildError>
where
    F: Fn(Task) -> Result<O, BuildError> + Sync,
    O: Send,
{
    let (sender, receiver) = channel();

    rayon::scope(|s| {
        for &task in tasks {
            let sender = sender.clone();
            s.spawn(move |_| {
                // The receiver outlives the scope, so this cannot fail.
                let _ = sender.send(exec_guarded(exec, task));
            });
        }
    });

    drop(sender);

    let mut outputs = Vec::with_capacity(tasks.len());
    let mut first = None;

    for result in receiver {
        match result {
            Ok(output) => outputs.push(output),
            Err(e) if first.is_none() => first = Some(e),
            Err(e) => tracing::error!("{e}"),
        }
    }

    match first {
        Some(e) => Err(e),
        None => Ok(outputs),
    }
}

fn exec_guarded<F, O>(exec: &F, task: Task) -> Result<O, BuildError>
where
    F: Fn(Task) -> Result<O, BuildError>,
{
    match catch_unwind(AssertUnwindSafe(|| exec(task))) {
        Ok(result) => result,
        Err(panic) => {
            let msg = if let Some(s) = panic.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                String::from("unknown payload")
            };

            Err(BuildError::Task(task, TaskError::Panic(msg)))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::error::CleanError;

    fn fail(task: Task) -> BuildError {
        BuildError::Task(
            task,
            TaskError::Clean(CleanError {
                path: "app".into(),
                source: std::io::Error::other("boom"),
            }),
        )
    }

    #[test]
    fn test_steps_run_in_order() {
        let log = Mutex::new(Vec::new());
        let seq = Sequence::new([
            Step::One(Task::Clean),
            Step::Parallel(vec![Task::Html, Task::Js]),
            Step::One(Task::Fonts),
        ]);

        seq.run(&|task| {
            log.lock().unwrap().push(task);
            Ok(())
        })
        .unwrap();

        let log = log.into_inner().unwrap();
        assert_eq!(log.len(), 4);
        assert_eq!(log[0], Task::Clean);
        assert!(log[1..3].contains(&Task::Html));
        assert!(log[1..3].contains(&Task::Js));
        assert_eq!(log[3], Task::Fonts);
    }

    #[test]
    fn test_failure_stops_later_steps() {
        let log = Mutex::new(Vec::new());
        let seq = Sequence::new([
            Step::One(Task::Clean),
            Step::Parallel(vec![Task::Html, Task::Js]),
        ]);

        let result = seq.run(&|task| {
            log.lock().unwrap().push(task);
            match task {
                Task::Clean => Err(fail(task)),
                _ => Ok(()),
            }
        });

        assert!(matches!(result, Err(BuildError::Task(Task::Clean, _))));
        assert_eq!(log.into_inner().unwrap(), vec![Task::Clean]);
    }

    #[test]
    fn test_parallel_siblings_complete_before_failing() {
        let log = Mutex::new(Vec::new());
        let seq = Sequence::new([
            Step::Parallel(vec![Task::Html, Task::Img]),
            Step::One(Task::Fonts),
        ]);

        let result = seq.run(&|task| {
            match task {
                Task::Html => return Err(fail(task)),
                Task::Img => thread::sleep(Duration::from_millis(50)),
                _ => {}
            }
            log.lock().unwrap().push(task);
            Ok(())
        });

        assert!(matches!(result, Err(BuildError::Task(Task::Html, _))));
        assert_eq!(log.into_inner().unwrap(), vec![Task::Img]);
    }

    #[test]
    fn test_first_failure_wins() {
        let seq = Sequence::new([Step::Parallel(vec![Task::Html, Task::Sass])]);

        let result = seq.run(&|task| {
            if task == Task::Sass {
                thread::sleep(Duration::from_millis(50));
            }
            Err::<(), _>(fail(task))
        });

        assert!(matches!(result, Err(BuildError::Task(Task::Html, _))));
    }

    #[test]
    fn test_panic_becomes_task_error() {
        let seq = Sequence::new([Step::One(Task::Js)]);

        let result = seq.run(&|_| -> Result<(), BuildError> { panic!("lint exploded") });

        match result {
            Err(BuildError::Task(Task::Js, TaskError::Panic(msg))) => {
                assert_eq!(msg, "lint exploded")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
