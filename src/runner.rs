use std::sync::mpsc::Receiver;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use indicatif::ProgressStyle;
use tracing::Level;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::config::Config;
use crate::error::{BuildError, TaskError};
use crate::io;
use crate::pipeline::{self, Summary};
use crate::reload::Reloader;
use crate::task::Task;
use crate::tools::Toolchain;

static TASK_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed}] {msg}")
        .expect("Error setting progress bar template")
});

/// A long-lived task (dev server or watcher) running on its own thread.
#[derive(Debug)]
pub struct Service {
    task: Task,
    handle: JoinHandle<Result<(), TaskError>>,
}

impl Service {
    fn spawn<F>(task: Task, func: F) -> Result<Self, TaskError>
    where
        F: FnOnce() -> Result<(), TaskError> + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name(format!("tsumiki-{task}"))
            .spawn(move || {
                let result = func();
                if let Err(e) = &result {
                    tracing::error!("{task} stopped: {e}");
                }
                result
            })?;

        Ok(Self { task, handle })
    }

    pub fn task(&self) -> Task {
        self.task
    }

    /// Blocks until the service stops.
    pub fn join(self) -> Result<(), BuildError> {
        match self.handle.join() {
            Ok(result) => result.map_err(|e| BuildError::Task(self.task, e)),
            Err(_) => Err(BuildError::Task(
                self.task,
                TaskError::Panic("service thread panicked".into()),
            )),
        }
    }
}

/// Executes named tasks against one configuration and toolchain.
///
/// The runner owns the reload channel: pipelines run as tasks send a reload
/// signal when they finish, and `connect` takes the receiving end to feed
/// the live reload server.
#[derive(Clone)]
pub struct Runner {
    config: Config,
    tools: Toolchain,
    reloader: Reloader,
    events: Arc<Mutex<Option<Receiver<()>>>>,
}

impl Runner {
    pub fn new(config: Config, tools: Toolchain) -> Self {
        let (reloader, events) = Reloader::channel();

        Self {
            config,
            tools,
            reloader,
            events: Arc::new(Mutex::new(Some(events))),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn reloader(&self) -> &Reloader {
        &self.reloader
    }

    /// Takes the receiving end of the reload channel. Only the first caller
    /// gets it.
    pub fn subscribe(&self) -> Option<Receiver<()>> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Runs `task`, expanding composite tasks into their sequences, and
    /// returns the services it left running.
    ///
    /// `dist` always runs with the production profile, switching to it if
    /// the runner was created with a development configuration.
    pub fn run(&self, task: Task) -> Result<Vec<Service>, BuildError> {
        if task == Task::Dist && !self.config.dist_mode() {
            let config = self.config.clone().with_profile(crate::Profile::Dist);
            return self.with_config(config).run(task);
        }

        match task.sequence() {
            Some(sequence) => {
                tracing::debug!("running sequence {task}");
                let services = sequence.run(&|task| self.run(task))?;
                Ok(services.into_iter().flatten().collect())
            }
            None => self.run_leaf(task),
        }
    }

    /// Runs a single pipeline without sending a reload signal.
    pub fn build(&self, task: Task) -> Result<Summary, TaskError> {
        match pipeline::run(task, &self.config, &self.tools) {
            Some(result) => Ok(result?),
            None => Err(TaskError::NotPipeline(task)),
        }
    }

    fn with_config(&self, config: Config) -> Self {
        Self {
            config,
            ..self.clone()
        }
    }

    fn run_leaf(&self, task: Task) -> Result<Vec<Service>, BuildError> {
        let span = tracing::span!(Level::INFO, "task", name = task.name());
        span.pb_set_style(&TASK_STYLE);
        span.pb_set_message(&format!("Running {task}"));
        let _enter = span.enter();

        let s = Instant::now();

        let result = match task {
            Task::Clean => io::clean(&self.config.out(""))
                .map(|_| Vec::new())
                .map_err(TaskError::from),
            Task::Connect => self.connect(),
            Task::Watch => self.watch(),
            _ => self.build(task).map(|summary| {
                tracing::info!("{summary} {}", io::as_overhead(s));
                self.reloader.reload();
                Vec::new()
            }),
        };

        result.map_err(|e| BuildError::Task(task, e))
    }

    #[cfg(feature = "server")]
    fn connect(&self) -> Result<Vec<Service>, TaskError> {
        #[cfg(feature = "live")]
        let reload_port = match self.subscribe() {
            Some(events) => {
                // Signals from a build that ran before the server existed.
                while events.try_recv().is_ok() {}
                Some(crate::reload::start(events)?)
            }
            None => {
                tracing::warn!("live reload is already running");
                None
            }
        };

        #[cfg(not(feature = "live"))]
        let reload_port = None;

        let root = self.config.out("");
        let port = self.config.port();

        let service = Service::spawn(Task::Connect, move || {
            crate::server::serve(root, port, reload_port).map_err(TaskError::from)
        })?;

        Ok(vec![service])
    }

    #[cfg(not(feature = "server"))]
    fn connect(&self) -> Result<Vec<Service>, TaskError> {
        Err(TaskError::Disabled("server"))
    }

    #[cfg(feature = "live")]
    fn watch(&self) -> Result<Vec<Service>, TaskError> {
        let runner = self.clone();

        let service = Service::spawn(Task::Watch, move || {
            crate::watch::watch(&runner).map_err(TaskError::from)
        })?;

        Ok(vec![service])
    }

    #[cfg(not(feature = "live"))]
    fn watch(&self) -> Result<Vec<Service>, TaskError> {
        Err(TaskError::Disabled("live"))
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("config", &self.config)
            .field("tools", &self.tools)
            .finish()
    }
}
