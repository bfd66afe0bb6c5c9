#![forbid(unsafe_code)]
//! A task runner for static front-end projects.
//!
//! Sources live under `src/` (`html`, `js`, `scss`, `img`, `fonts`) and are
//! built into `app/` by five pipelines. Named tasks combine the pipelines
//! with cleaning, a development server and a file watcher:
//!
//! | task      | runs                                  |
//! |-----------|---------------------------------------|
//! | `default` | `{connect, watch}`                    |
//! | `dev`     | `clean`, `{html, js, sass, img, fonts}` |
//! | `dist`    | like `dev`, with the `Dist` profile   |
//! | `work`    | `dev`, `default`                      |
//!
//! `dist` bundles all scripts into a single `app/js/app.min.js`. Older
//! front-end builds of the same layout emitted `app.min.min.js`; pages that
//! link to that name need updating.
//!
//! ```rust,no_run
//! use tsumiki::{Config, Runner, Task, Toolchain};
//!
//! let config = Config::for_task(Task::Dist).with_root("site");
//! let runner = Runner::new(config, Toolchain::native());
//! runner.run(Task::Dist)?;
//! # Ok::<(), tsumiki::BuildError>(())
//! ```

mod config;
mod error;
mod io;
#[cfg(feature = "logging")]
pub mod logging;
pub mod pipeline;
pub mod reload;
mod runner;
mod sequence;
#[cfg(feature = "server")]
pub mod server;
mod task;
pub mod tools;
#[cfg(feature = "live")]
pub mod watch;

pub use crate::config::{Config, DEFAULT_PORT, DIR_OUT, DIR_SRC, Profile};
pub use crate::error::*;
pub use crate::runner::{Runner, Service};
pub use crate::sequence::{Sequence, Step};
pub use crate::task::Task;
pub use crate::tools::Toolchain;
