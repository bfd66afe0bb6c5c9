use std::fmt::Display;
use std::fs;
use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};
use console::Style;
use glob::{MatchOptions, glob_with};

use crate::error::{CleanError, PipelineError};

const ANSI_BLUE: Style = Style::new().blue();

/// Wildcards never match hidden files such as `.gitkeep` or `.DS_Store`.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: true,
};

pub fn as_overhead(s: Instant) -> impl Display {
    let e = Instant::now();
    let f = format!("(+{}ms)", e.duration_since(s).as_millis());
    ANSI_BLUE.apply_to(f)
}

/// Delete the output path if it exists, whether it is a directory tree or a
/// single file.
pub fn clean(out: &Utf8Path) -> Result<(), CleanError> {
    let s = Instant::now();

    if let Ok(meta) = fs::symlink_metadata(out) {
        let removed = if meta.is_dir() {
            fs::remove_dir_all(out)
        } else {
            fs::remove_file(out)
        };

        removed.map_err(|source| CleanError {
            path: out.to_path_buf(),
            source,
        })?;
    }

    tracing::info!("cleaned {out} {}", as_overhead(s));

    Ok(())
}

/// A file matched by a source glob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path on disk.
    pub path: Utf8PathBuf,
    /// Path relative to the glob base, used to mirror the file in the output.
    pub rel: Utf8PathBuf,
}

/// Lists the regular files under `base` matching `pattern`, sorted by path.
/// Hidden files are skipped unless the pattern names the leading dot.
///
/// The base directory must exist; a missing one is reported instead of being
/// treated as an empty match.
pub fn sources(base: &Utf8Path, pattern: &str) -> Result<Vec<SourceFile>, PipelineError> {
    if !base.is_dir() {
        return Err(PipelineError::MissingSource(base.to_path_buf()));
    }

    let escaped = glob::Pattern::escape(base.as_str());
    let mut files = Vec::new();

    for path in glob_with(Utf8Path::new(&escaped).join(pattern).as_str(), MATCH_OPTIONS)? {
        let path = Utf8PathBuf::try_from(path?)?;

        if !path.is_file() {
            continue;
        }

        // Glob results always start with the base they were rooted at.
        let rel = path.strip_prefix(base).unwrap_or(&path).to_path_buf();
        files.push(SourceFile { path, rel });
    }

    files.sort_by(|a, b| a.rel.cmp(&b.rel));
    Ok(files)
}

/// Writes `data` to `path`, creating parent directories as needed.
pub fn write(path: &Utf8Path, data: impl AsRef<[u8]>) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    fs::write(path, data)
}

/// Returns `rel` with `.min` inserted before the new extension `ext`, e.g.
/// `pages/main.scss` + `css` -> `pages/main.min.css`.
pub fn min_name(rel: &Utf8Path, ext: &str) -> Utf8PathBuf {
    let stem = rel.file_stem().unwrap_or_default();
    rel.with_file_name(format!("{stem}.min.{ext}"))
}
