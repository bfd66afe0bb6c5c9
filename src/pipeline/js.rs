use std::fs;

use camino::Utf8Path;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use super::Summary;
use crate::config::Config;
use crate::error::{PipelineError, ToolError};
use crate::io::{self, SourceFile};
use crate::task::Task;
use crate::tools::{JsLinter, Toolchain};

/// Name of the concatenated script before the `.min` suffix is applied.
pub const BUNDLE: &str = "app.js";

/// `src/js/**/*.js` -> lint -> [dist: concat + minify] -> `*.min.js` -> `app/js/`
///
/// The `.min` suffix is applied in both profiles, so development builds ship
/// untouched sources under minified names.
pub fn js(config: &Config, tools: &Toolchain) -> Result<Summary, PipelineError> {
    let files = io::sources(&config.src("js"), "**/*.js")?;
    let out = config.out("js");

    lint(&files, tools.linter.as_ref());

    if !config.dist_mode() {
        files
            .par_iter()
            .try_for_each(|file| -> Result<_, PipelineError> {
                let data = fs::read(&file.path)?;
                io::write(&out.join(io::min_name(&file.rel, "js")), data)?;
                Ok(())
            })?;

        return Ok(Summary::new(Task::Js, files.len()));
    }

    if files.is_empty() {
        return Ok(Summary::new(Task::Js, 0));
    }

    let mut bundle = Vec::new();
    for (i, file) in files.iter().enumerate() {
        if i > 0 {
            bundle.push(b'\n');
        }
        bundle.extend(fs::read(&file.path)?);
    }

    let path = out.join(io::min_name(Utf8Path::new(BUNDLE), "js"));
    let data = tools
        .js
        .minify(&bundle)
        .map_err(|e| PipelineError::Tool(path.clone(), e))?;

    io::write(&path, data)?;

    Ok(Summary::new(Task::Js, 1))
}

/// Reports lint diagnostics as warnings. Linting never fails the pipeline.
fn lint(files: &[SourceFile], linter: &dyn JsLinter) {
    let result = files.par_iter().try_for_each(|file| {
        match linter.lint(&file.path) {
            Ok(diagnostics) => {
                for diagnostic in diagnostics {
                    tracing::warn!("{diagnostic}");
                }
            }
            Err(ToolError::Missing(program)) => return Err(program),
            Err(e) => tracing::warn!("couldn't lint {}: {e}", file.path),
        }

        Ok(())
    });

    if let Err(program) = result {
        tracing::warn!("{program} not found in PATH, skipping lint");
    }
}
