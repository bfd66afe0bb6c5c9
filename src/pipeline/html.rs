use std::fs;

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use super::Summary;
use crate::config::Config;
use crate::error::PipelineError;
use crate::io;
use crate::task::Task;
use crate::tools::Toolchain;

/// `src/html/**/*.html` -> minify -> `app/`
pub fn html(config: &Config, tools: &Toolchain) -> Result<Summary, PipelineError> {
    let files = io::sources(&config.src("html"), "**/*.html")?;
    let out = config.out("");

    files
        .par_iter()
        .try_for_each(|file| -> Result<_, PipelineError> {
            let data = fs::read(&file.path)?;
            let data = tools
                .html
                .minify(&data)
                .map_err(|e| PipelineError::Tool(file.path.clone(), e))?;

            io::write(&out.join(&file.rel), data)?;
            Ok(())
        })?;

    Ok(Summary::new(Task::Html, files.len()))
}
