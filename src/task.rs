//! The closed set of named tasks and the fixed sequences behind the
//! composite ones.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::error::BuildError;
use crate::sequence::{Sequence, Step};

/// A named unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {
    /// Minify the HTML sources.
    Html,
    /// Lint, optionally bundle and minify, and rename the scripts.
    Js,
    /// Compile, minify and optionally prefix the stylesheets.
    Sass,
    /// Copy, optionally optimizing, the images.
    Img,
    /// Copy the fonts.
    Fonts,
    /// Delete the output directory.
    Clean,
    /// Watch the sources and rebuild on change.
    Watch,
    /// Serve the output directory with live reload.
    Connect,
    /// Clean and build without production optimizations.
    Dev,
    /// Clean and build with every production optimization.
    Dist,
    /// Build, then serve and watch.
    Work,
    /// Serve and watch without building.
    Default,
}

impl Task {
    pub const ALL: [Task; 12] = [
        Task::Html,
        Task::Js,
        Task::Sass,
        Task::Img,
        Task::Fonts,
        Task::Clean,
        Task::Watch,
        Task::Connect,
        Task::Dev,
        Task::Dist,
        Task::Work,
        Task::Default,
    ];

    /// The five content pipelines, in the order they are listed in a build step.
    pub const PIPELINES: [Task; 5] = [Task::Html, Task::Js, Task::Sass, Task::Img, Task::Fonts];

    pub fn name(self) -> &'static str {
        match self {
            Task::Html => "html",
            Task::Js => "js",
            Task::Sass => "sass",
            Task::Img => "img",
            Task::Fonts => "fonts",
            Task::Clean => "clean",
            Task::Watch => "watch",
            Task::Connect => "connect",
            Task::Dev => "dev",
            Task::Dist => "dist",
            Task::Work => "work",
            Task::Default => "default",
        }
    }

    pub fn is_pipeline(self) -> bool {
        Self::PIPELINES.contains(&self)
    }

    /// Returns the sequence a composite task expands to, or `None` for a
    /// leaf task that runs directly.
    pub fn sequence(self) -> Option<Sequence> {
        let build = || Step::Parallel(Self::PIPELINES.to_vec());

        match self {
            Task::Default => Some(Sequence::new([Step::Parallel(vec![
                Task::Connect,
                Task::Watch,
            ])])),
            Task::Dev | Task::Dist => Some(Sequence::new([Step::One(Task::Clean), build()])),
            Task::Work => Some(Sequence::new([
                Step::One(Task::Dev),
                Step::One(Task::Default),
            ])),
            _ => None,
        }
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Task {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|task| task.name() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|task| task.name()).collect();
                BuildError::UnknownTask(s.to_string(), known.join(", "))
            })
    }
}
