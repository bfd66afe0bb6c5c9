use std::fs;

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use super::Summary;
use crate::config::Config;
use crate::error::PipelineError;
use crate::io;
use crate::task::Task;
use crate::tools::Toolchain;

/// `src/img/**/*` -> [dist: optimize] -> `app/img/`
///
/// Optimization only runs for production builds, and a result that came out
/// larger than its source is thrown away.
pub fn img(config: &Config, tools: &Toolchain) -> Result<Summary, PipelineError> {
    let files = io::sources(&config.src("img"), "**/*")?;
    let out = config.out("img");

    files
        .par_iter()
        .try_for_each(|file| -> Result<_, PipelineError> {
            let data = fs::read(&file.path)?;

            let data = if config.dist_mode() {
                let optimized = tools
                    .image
                    .optimize(&file.path, &data)
                    .map_err(|e| PipelineError::Tool(file.path.clone(), e))?;

                if optimized.len() < data.len() {
                    tracing::debug!(
                        "{}: {} -> {} bytes",
                        file.rel,
                        data.len(),
                        optimized.len()
                    );
                    optimized
                } else {
                    data
                }
            } else {
                data
            };

            io::write(&out.join(&file.rel), data)?;
            Ok(())
        })?;

    Ok(Summary::new(Task::Img, files.len()))
}
