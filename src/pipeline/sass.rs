use camino::{Utf8Path, Utf8PathBuf};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use super::Summary;
use crate::config::Config;
use crate::error::{PipelineError, ToolError};
use crate::io::{self, SourceFile};
use crate::task::Task;
use crate::tools::Toolchain;

/// `src/scss/**/*.scss` -> compile -> minify -> [dist: prefix] -> `*.min.css` -> `app/css/`
///
/// Partials (`_name.scss`) are only compiled through the files importing
/// them. A stylesheet that fails to compile is logged and skipped, the rest
/// are still written, and the pipeline reports the failures at the end.
pub fn sass(config: &Config, tools: &Toolchain) -> Result<Summary, PipelineError> {
    let files: Vec<_> = io::sources(&config.src("scss"), "**/*.scss")?
        .into_iter()
        .filter(|file| !is_partial(&file.rel))
        .collect();

    let out = config.out("css");

    let results = files
        .par_iter()
        .map(|file| -> Result<_, PipelineError> {
            match stylesheet(config, tools, file) {
                Ok(css) => {
                    io::write(&out.join(io::min_name(&file.rel, "css")), css)?;
                    Ok(None)
                }
                Err(e) => {
                    tracing::error!("{}: {e}", file.path);
                    Ok(Some(file.path.clone()))
                }
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let failed: Vec<Utf8PathBuf> = results.into_iter().flatten().collect();

    if !failed.is_empty() {
        return Err(PipelineError::Compile(failed));
    }

    Ok(Summary::new(Task::Sass, files.len()))
}

fn stylesheet(config: &Config, tools: &Toolchain, file: &SourceFile) -> Result<String, ToolError> {
    let css = tools.sass.compile(&file.path)?;
    let css = tools.css.minify(&css)?;

    if config.dist_mode() {
        tools.prefixer.prefix(&css)
    } else {
        Ok(css)
    }
}

fn is_partial(rel: &Utf8Path) -> bool {
    rel.file_name().is_some_and(|name| name.starts_with('_'))
}
