use camino::{Utf8Path, Utf8PathBuf};

use crate::task::Task;

/// Root of every source directory, relative to the project root.
pub const DIR_SRC: &str = "src";
/// The sole write target, relative to the project root.
pub const DIR_OUT: &str = "app";

/// Port of the development HTTP server.
pub const DEFAULT_PORT: u16 = 3000;

/// Selects between fast development output and optimized production output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// Fast builds; production-only stages are skipped.
    #[default]
    Dev,
    /// Every optimization stage runs.
    Dist,
}

/// Configuration for one invocation, built once and never mutated. Every
/// pipeline receives it by reference.
#[derive(Debug, Clone)]
pub struct Config {
    profile: Profile,
    root: Utf8PathBuf,
    port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: Profile::Dev,
            root: Utf8PathBuf::from("."),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Derives the configuration for running `task`. Only `dist` selects the
    /// production profile.
    pub fn for_task(task: Task) -> Self {
        let profile = match task {
            Task::Dist => Profile::Dist,
            _ => Profile::Dev,
        };

        Self::default().with_profile(profile)
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_root(mut self, root: impl Into<Utf8PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn dist_mode(&self) -> bool {
        self.profile == Profile::Dist
    }

    /// `"dev"` or `"dist"`.
    pub fn environment(&self) -> &'static str {
        match self.profile {
            Profile::Dev => "dev",
            Profile::Dist => "dist",
        }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Source directory of one asset kind, e.g. `src/scss`.
    pub fn src(&self, kind: &str) -> Utf8PathBuf {
        self.root.join(DIR_SRC).join(kind)
    }

    /// The output directory, or a subdirectory of it when `sub` is not empty.
    pub fn out(&self, sub: &str) -> Utf8PathBuf {
        let out = self.root.join(DIR_OUT);
        if sub.is_empty() { out } else { out.join(sub) }
    }
}
