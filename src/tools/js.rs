use std::io::{ErrorKind, Write};
use std::process::{Command, Output, Stdio};

use camino::{Utf8Path, Utf8PathBuf};

use super::{Diagnostic, JsLinter, JsMinifier};
use crate::error::ToolError;

/// JavaScript minifier that pipes the source through the `esbuild` binary.
///
/// **Note:** requires `esbuild` to be available in the system PATH.
pub struct Esbuild;

impl JsMinifier for Esbuild {
    fn minify(&self, js: &[u8]) -> Result<Vec<u8>, ToolError> {
        let mut child = Command::new("esbuild")
            .arg("--minify")
            .arg("--loader=js")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| not_found(e, "esbuild"))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(js)?;
        }

        let output = child.wait_with_output()?;

        if !output.status.success() {
            return Err(failure("esbuild", output));
        }

        Ok(output.stdout)
    }
}

/// JavaScript linter that runs the `jshint` binary with the unix reporter.
///
/// **Note:** requires `jshint` to be available in the system PATH.
pub struct Jshint;

impl JsLinter for Jshint {
    fn lint(&self, path: &Utf8Path) -> Result<Vec<Diagnostic>, ToolError> {
        let output = Command::new("jshint")
            .arg("--reporter=unix")
            .arg(path.as_str())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| not_found(e, "jshint"))?;

        let stdout = String::from_utf8(output.stdout.clone())?;
        let diagnostics: Vec<_> = stdout.lines().filter_map(parse_unix).collect();

        // jshint exits with 2 when it found problems, which is not a failure.
        if !output.status.success() && diagnostics.is_empty() {
            return Err(failure("jshint", output));
        }

        Ok(diagnostics)
    }
}

fn not_found(e: std::io::Error, program: &'static str) -> ToolError {
    if e.kind() == ErrorKind::NotFound {
        ToolError::Missing(program)
    } else {
        ToolError::Io(e)
    }
}

fn failure(program: &'static str, output: Output) -> ToolError {
    ToolError::Process {
        program,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

/// Parses one `path:line:col: message` line.
fn parse_unix(line: &str) -> Option<Diagnostic> {
    let (location, message) = line.split_once(": ")?;

    let mut location = location.rsplitn(3, ':');
    let column = location.next()?.parse().ok()?;
    let line = location.next()?.parse().ok()?;
    let file = location.next()?;

    Some(Diagnostic {
        file: Utf8PathBuf::from(file),
        line,
        column,
        message: message.to_string(),
    })
}
