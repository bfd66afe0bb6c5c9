use camino::Utf8Path;

use super::SassCompiler;
use crate::error::ToolError;

/// Sass compiler backed by `grass`.
pub struct Grass;

impl SassCompiler for Grass {
    fn compile(&self, path: &Utf8Path) -> Result<String, ToolError> {
        grass::from_path(path, &grass::Options::default())
            .map_err(|e| ToolError::Sass(e.to_string()))
    }
}
