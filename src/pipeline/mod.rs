//! The five content pipelines.
//!
//! Each pipeline reads every file matching a fixed glob under `src/`, runs it
//! through its stages and mirrors it into `app/`, keeping the path relative
//! to the glob base. Stages that only make sense for production builds are
//! skipped unless the configuration is in the `Dist` profile.

mod fonts;
mod html;
mod img;
mod js;
mod sass;

use std::fmt;

use crate::config::Config;
use crate::error::PipelineError;
use crate::task::Task;
use crate::tools::Toolchain;

pub use self::fonts::fonts;
pub use self::html::html;
pub use self::img::img;
pub use self::js::{BUNDLE, js};
pub use self::sass::sass;

/// Outcome of a single pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub task: Task,
    /// Number of files written to the output directory.
    pub files: usize,
}

impl Summary {
    fn new(task: Task, files: usize) -> Self {
        Self { task, files }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: wrote {} file(s)", self.task, self.files)
    }
}

/// Runs the pipeline behind `task`. Returns `None` for tasks that are not
/// pipelines.
pub fn run(
    task: Task,
    config: &Config,
    tools: &Toolchain,
) -> Option<Result<Summary, PipelineError>> {
    let result = match task {
        Task::Html => html(config, tools),
        Task::Js => js(config, tools),
        Task::Sass => sass(config, tools),
        Task::Img => img(config, tools),
        Task::Fonts => fonts(config),
        _ => return None,
    };

    Some(result)
}
