//! Unminifier adapter.
//!
//! Turns single-line minified source into a stable, line-addressable sibling
//! file by shelling out to `js-beautify`. The subprocess exit status is the
//! only success signal; the output is not validated, so a formatter that
//! silently mangles the file surfaces later as anchor-not-found.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::cli::resolve_cli;
use crate::pathutil;

const JS_BEAUTIFY_BIN: &str = "js-beautify";

/// Suffix of the unminified sibling: `foo.js` → `foo.unmin.js`.
const UNMIN_SUFFIX: &str = ".unmin";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Error from the formatter subprocess.
#[derive(Debug)]
pub enum UnminError {
    /// The formatter could not be spawned (missing binary, permission error).
    SpawnFailed(std::io::Error),
    /// The formatter exited with a non-zero status code.
    NonZeroExit { code: Option<i32>, stderr: String },
}

impl fmt::Display for UnminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpawnFailed(e) => write!(f, "Failed to spawn {JS_BEAUTIFY_BIN}: {e}"),
            Self::NonZeroExit { code, stderr } => {
                let code_str = code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                if stderr.is_empty() {
                    write!(f, "{JS_BEAUTIFY_BIN} exited with code {code_str}")
                } else {
                    write!(f, "{JS_BEAUTIFY_BIN} exited with code {code_str}: {stderr}")
                }
            }
        }
    }
}

impl std::error::Error for UnminError {}

// ---------------------------------------------------------------------------
// Capability interface
// ---------------------------------------------------------------------------

/// Narrow capability the patch pipeline needs: reformat one file to its
/// `.unmin` sibling and return that path. Tests substitute a fake.
pub trait Unminifier {
    fn unminify(&self, path: &Path) -> Result<PathBuf, UnminError>;
}

/// Production unminifier backed by the `js-beautify` binary.
pub struct JsBeautify {
    bin: String,
}

impl Default for JsBeautify {
    fn default() -> Self {
        Self {
            bin: resolve_cli(JS_BEAUTIFY_BIN),
        }
    }
}

impl Unminifier for JsBeautify {
    fn unminify(&self, path: &Path) -> Result<PathBuf, UnminError> {
        let unmin_path = pathutil::add_ext_prefix(path, UNMIN_SUFFIX);

        let output = Command::new(&self.bin)
            .arg(path)
            .arg("-o")
            .arg(&unmin_path)
            .output()
            .map_err(UnminError::SpawnFailed)?;

        if !output.status.success() {
            return Err(UnminError::NonZeroExit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(unmin_path)
    }
}
