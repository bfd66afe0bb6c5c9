#[cfg(feature = "live")]
use std::sync::mpsc::RecvError;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::task::Task;

/// Failure reported by one of the external processing stages.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sass compilation error: {0}")]
    Sass(String),

    #[error("CSS error: {0}")]
    Css(String),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// An external program exited with a non-zero status.
    #[error("{program} execution failed: {stderr}")]
    Process {
        program: &'static str,
        stderr: String,
    },

    /// An external program is not installed or not on the PATH.
    #[error("{0} not found in PATH")]
    Missing(&'static str),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Couldn't read or write a file.\n{0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Source directory '{0}' does not exist")]
    MissingSource(Utf8PathBuf),

    #[error("Couldn't compile glob pattern.\n{0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Couldn't run glob.\n{0}")]
    Glob(#[from] glob::GlobError),

    #[error("Couldn't convert path to UTF-8.\n{0}")]
    PathFormat(#[from] camino::FromPathBufError),

    #[error("File '{0}': {1}")]
    Tool(Utf8PathBuf, ToolError),

    /// One or more stylesheets failed to compile; the rest were written.
    #[error("{} stylesheet(s) failed to compile", .0.len())]
    Compile(Vec<Utf8PathBuf>),
}

#[derive(Debug, Error)]
#[error("Couldn't remove '{path}': {source}")]
pub struct CleanError {
    pub path: Utf8PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[cfg(feature = "live")]
#[derive(Debug, Error)]
pub enum WatchError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Notify(#[from] notify::Error),

    #[error(transparent)]
    Recv(#[from] RecvError),
}

#[cfg(feature = "server")]
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("Failed to build runtime: {0}")]
    Runtime(std::io::Error),

    #[error("Couldn't bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Error raised by a single named task.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Clean(#[from] CleanError),

    #[cfg(feature = "live")]
    #[error("Error while watching for file changes:\n{0}")]
    Watch(#[from] WatchError),

    #[cfg(feature = "server")]
    #[error("Error while running the dev server:\n{0}")]
    Serve(#[from] ServeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("'{0}' is not a pipeline")]
    NotPipeline(Task),

    /// The task needs a cargo feature that was not compiled in.
    #[error("task requires the '{0}' feature")]
    Disabled(&'static str),

    #[error("task panicked: {0}")]
    Panic(String),
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Task '{0}':\n{1}")]
    Task(Task, TaskError),

    #[error("Unknown task '{0}', expected one of: {1}")]
    UnknownTask(String, String),
}
