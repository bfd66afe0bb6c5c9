//! External processing stages.
//!
//! Every stage a pipeline delegates to is modelled as a trait, so that any
//! equivalent implementation can be plugged in. [`Toolchain::native`] wires
//! up the default implementations:
//!
//! | stage            | implementation                   |
//! |------------------|----------------------------------|
//! | HTML minifier    | `minify-html`                    |
//! | Sass compiler    | `grass`                          |
//! | CSS optimizer    | `lightningcss`                   |
//! | vendor prefixer  | `lightningcss` + browserslist    |
//! | JS linter        | `jshint` executable              |
//! | JS minifier      | `esbuild` executable             |
//! | image optimizer  | `image` (PNG and JPEG only)      |
//!
//! The image optimizer leaves every other format (GIF, SVG, WebP, ...) as it
//! is; those files are copied to the output unoptimized.

mod css;
mod html;
mod image;
mod js;
mod sass;

use std::fmt;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::ToolError;

pub use self::css::{Lightning, LightningPrefixer};
pub use self::html::MinifyHtml;
pub use self::image::Reencode;
pub use self::js::{Esbuild, Jshint};
pub use self::sass::Grass;

pub trait HtmlMinifier: Send + Sync {
    fn minify(&self, html: &[u8]) -> Result<Vec<u8>, ToolError>;
}

pub trait SassCompiler: Send + Sync {
    /// Compiles the stylesheet at `path`, resolving imports relative to it.
    fn compile(&self, path: &Utf8Path) -> Result<String, ToolError>;
}

pub trait CssOptimizer: Send + Sync {
    fn minify(&self, css: &str) -> Result<String, ToolError>;
}

pub trait Prefixer: Send + Sync {
    /// Adds vendor prefixes for the configured browser range.
    fn prefix(&self, css: &str) -> Result<String, ToolError>;
}

pub trait JsLinter: Send + Sync {
    fn lint(&self, path: &Utf8Path) -> Result<Vec<Diagnostic>, ToolError>;
}

pub trait JsMinifier: Send + Sync {
    fn minify(&self, js: &[u8]) -> Result<Vec<u8>, ToolError>;
}

pub trait ImageOptimizer: Send + Sync {
    /// Returns the optimized bytes, or the input unchanged for formats it
    /// does not handle.
    fn optimize(&self, path: &Utf8Path, data: &[u8]) -> Result<Vec<u8>, ToolError>;
}

/// A single problem reported by a linter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: Utf8PathBuf,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: line {}, col {}, {}",
            self.file, self.line, self.column, self.message
        )
    }
}

/// The full set of processing stages used by the pipelines.
#[derive(Clone)]
pub struct Toolchain {
    pub html: Arc<dyn HtmlMinifier>,
    pub sass: Arc<dyn SassCompiler>,
    pub css: Arc<dyn CssOptimizer>,
    pub prefixer: Arc<dyn Prefixer>,
    pub linter: Arc<dyn JsLinter>,
    pub js: Arc<dyn JsMinifier>,
    pub image: Arc<dyn ImageOptimizer>,
}

impl Toolchain {
    pub fn native() -> Self {
        Self {
            html: Arc::new(MinifyHtml::default()),
            sass: Arc::new(Grass),
            css: Arc::new(Lightning),
            prefixer: Arc::new(LightningPrefixer::default()),
            linter: Arc::new(Jshint),
            js: Arc::new(Esbuild),
            image: Arc::new(Reencode),
        }
    }

    pub fn with_html(mut self, html: impl HtmlMinifier + 'static) -> Self {
        self.html = Arc::new(html);
        self
    }

    pub fn with_sass(mut self, sass: impl SassCompiler + 'static) -> Self {
        self.sass = Arc::new(sass);
        self
    }

    pub fn with_css(mut self, css: impl CssOptimizer + 'static) -> Self {
        self.css = Arc::new(css);
        self
    }

    pub fn with_prefixer(mut self, prefixer: impl Prefixer + 'static) -> Self {
        self.prefixer = Arc::new(prefixer);
        self
    }

    pub fn with_linter(mut self, linter: impl JsLinter + 'static) -> Self {
        self.linter = Arc::new(linter);
        self
    }

    pub fn with_js(mut self, js: impl JsMinifier + 'static) -> Self {
        self.js = Arc::new(js);
        self
    }

    pub fn with_image(mut self, image: impl ImageOptimizer + 'static) -> Self {
        self.image = Arc::new(image);
        self
    }
}

impl fmt::Debug for Toolchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Toolchain(*)")
    }
}
