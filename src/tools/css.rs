use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

use super::{CssOptimizer, Prefixer};
use crate::error::ToolError;

/// Browser range used for vendor prefixing.
pub const DEFAULT_BROWSERS: &str = "last 10 versions";

/// CSS minifier backed by `lightningcss`. Without browser targets it never
/// adds prefixes.
pub struct Lightning;

impl CssOptimizer for Lightning {
    fn minify(&self, css: &str) -> Result<String, ToolError> {
        process(css, Targets::default())
    }
}

/// Vendor prefixer backed by `lightningcss` and a browserslist query.
pub struct LightningPrefixer {
    query: String,
}

impl LightningPrefixer {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

impl Default for LightningPrefixer {
    fn default() -> Self {
        Self::new(DEFAULT_BROWSERS)
    }
}

impl Prefixer for LightningPrefixer {
    fn prefix(&self, css: &str) -> Result<String, ToolError> {
        let browsers = Browsers::from_browserslist([self.query.as_str()])
            .map_err(|e| ToolError::Css(e.to_string()))?;

        let targets = match browsers {
            Some(browsers) => Targets::from(browsers),
            None => Targets::default(),
        };

        process(css, targets)
    }
}

fn process(css: &str, targets: Targets) -> Result<String, ToolError> {
    let mut sheet =
        StyleSheet::parse(css, ParserOptions::default()).map_err(|e| ToolError::Css(e.to_string()))?;

    sheet
        .minify(MinifyOptions {
            targets: targets.clone(),
            ..MinifyOptions::default()
        })
        .map_err(|e| ToolError::Css(e.to_string()))?;

    let out = sheet
        .to_css(PrinterOptions {
            minify: true,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| ToolError::Css(e.to_string()))?;

    Ok(out.code)
}
