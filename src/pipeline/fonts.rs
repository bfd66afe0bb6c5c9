use std::fs;

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use super::Summary;
use crate::config::Config;
use crate::error::PipelineError;
use crate::io;
use crate::task::Task;

/// `src/fonts/**/*` -> `app/fonts/`
pub fn fonts(config: &Config) -> Result<Summary, PipelineError> {
    let files = io::sources(&config.src("fonts"), "**/*")?;
    let out = config.out("fonts");

    files
        .par_iter()
        .try_for_each(|file| -> Result<_, PipelineError> {
            let path = out.join(&file.rel);

            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }

            fs::copy(&file.path, &path)?;
            Ok(())
        })?;

    Ok(Summary::new(Task::Fonts, files.len()))
}
