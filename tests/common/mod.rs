#![allow(dead_code)]

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;
use tsumiki::tools::{
    CssOptimizer, Diagnostic, HtmlMinifier, ImageOptimizer, JsLinter, JsMinifier, Prefixer,
    SassCompiler, Toolchain,
};
use tsumiki::{Config, Profile, ToolError};

/// A throwaway project directory with every source directory in place.
pub struct Site {
    _dir: TempDir,
    pub root: Utf8PathBuf,
}

impl Site {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();

        for kind in ["html", "js", "scss", "img", "fonts"] {
            fs::create_dir_all(root.join("src").join(kind)).unwrap();
        }

        Self { _dir: dir, root }
    }

    pub fn write(&self, rel: &str, data: impl AsRef<[u8]>) -> Utf8PathBuf {
        let path = self.root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, data).unwrap();
        path
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root.join(rel)).unwrap()
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.root.join(rel).exists()
    }

    /// Files under `dir`, relative to it and sorted.
    pub fn list(&self, dir: &str) -> Vec<String> {
        let base = self.root.join(dir);
        let mut out = Vec::new();
        walk(&base, &base, &mut out);
        out.sort();
        out
    }

    pub fn config(&self, profile: Profile) -> Config {
        Config::default()
            .with_root(self.root.clone())
            .with_profile(profile)
    }
}

fn walk(base: &Utf8Path, dir: &Utf8Path, out: &mut Vec<String>) {
    let Ok(entries) = dir.read_dir_utf8() else {
        return;
    };

    for entry in entries {
        let entry = entry.unwrap();
        let path = entry.path();
        if path.is_dir() {
            walk(base, path, out);
        } else {
            out.push(path.strip_prefix(base).unwrap().to_string());
        }
    }
}

/// Number of times each fake stage was invoked.
#[derive(Default)]
pub struct Calls {
    pub html: AtomicUsize,
    pub sass: AtomicUsize,
    pub css: AtomicUsize,
    pub prefix: AtomicUsize,
    pub lint: AtomicUsize,
    pub js: AtomicUsize,
    pub image: AtomicUsize,
}

impl Calls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

struct FakeHtml(Arc<Calls>);

impl HtmlMinifier for FakeHtml {
    fn minify(&self, html: &[u8]) -> Result<Vec<u8>, ToolError> {
        self.0.html.fetch_add(1, Ordering::SeqCst);
        let text = String::from_utf8_lossy(html);
        Ok(text.split_whitespace().collect::<Vec<_>>().join(" ").into_bytes())
    }
}

/// Echoes the source; fails on sources containing `ERROR`.
struct FakeSass(Arc<Calls>);

impl SassCompiler for FakeSass {
    fn compile(&self, path: &Utf8Path) -> Result<String, ToolError> {
        self.0.sass.fetch_add(1, Ordering::SeqCst);
        let source = fs::read_to_string(path)?;
        if source.contains("ERROR") {
            return Err(ToolError::Sass(format!("{path}: undefined variable")));
        }
        Ok(source.trim().to_string())
    }
}

struct FakeCss(Arc<Calls>);

impl CssOptimizer for FakeCss {
    fn minify(&self, css: &str) -> Result<String, ToolError> {
        self.0.css.fetch_add(1, Ordering::SeqCst);
        Ok(format!("min({css})"))
    }
}

struct FakePrefixer(Arc<Calls>);

impl Prefixer for FakePrefixer {
    fn prefix(&self, css: &str) -> Result<String, ToolError> {
        self.0.prefix.fetch_add(1, Ordering::SeqCst);
        Ok(format!("prefix({css})"))
    }
}

struct FakeLinter(Arc<Calls>);

impl JsLinter for FakeLinter {
    fn lint(&self, path: &Utf8Path) -> Result<Vec<Diagnostic>, ToolError> {
        self.0.lint.fetch_add(1, Ordering::SeqCst);
        Ok(vec![Diagnostic {
            file: path.to_path_buf(),
            line: 1,
            column: 1,
            message: "Missing \"use strict\" statement.".into(),
        }])
    }
}

struct FakeJs(Arc<Calls>);

impl JsMinifier for FakeJs {
    fn minify(&self, js: &[u8]) -> Result<Vec<u8>, ToolError> {
        self.0.js.fetch_add(1, Ordering::SeqCst);
        Ok(format!("minified({})", String::from_utf8_lossy(js)).into_bytes())
    }
}

/// Keeps the first half of every image.
struct FakeImage(Arc<Calls>);

impl ImageOptimizer for FakeImage {
    fn optimize(&self, _: &Utf8Path, data: &[u8]) -> Result<Vec<u8>, ToolError> {
        self.0.image.fetch_add(1, Ordering::SeqCst);
        Ok(data[..data.len() / 2].to_vec())
    }
}

/// Makes every image bigger.
pub struct InflatingImage;

impl ImageOptimizer for InflatingImage {
    fn optimize(&self, _: &Utf8Path, data: &[u8]) -> Result<Vec<u8>, ToolError> {
        let mut out = data.to_vec();
        out.extend_from_slice(data);
        Ok(out)
    }
}

/// A linter whose binary is not installed.
pub struct MissingLinter;

impl JsLinter for MissingLinter {
    fn lint(&self, _: &Utf8Path) -> Result<Vec<Diagnostic>, ToolError> {
        Err(ToolError::Missing("jshint"))
    }
}

pub fn tools() -> (Toolchain, Arc<Calls>) {
    let calls = Arc::new(Calls::default());

    let tools = Toolchain::native()
        .with_html(FakeHtml(calls.clone()))
        .with_sass(FakeSass(calls.clone()))
        .with_css(FakeCss(calls.clone()))
        .with_prefixer(FakePrefixer(calls.clone()))
        .with_linter(FakeLinter(calls.clone()))
        .with_js(FakeJs(calls.clone()))
        .with_image(FakeImage(calls.clone()));

    (tools, calls)
}
