//! Patch pipeline for Steam client scripts.
//!
//! Stages run strictly in order: restore a pristine copy if a previous patch
//! is detected, ensure a backup exists, unminify, locate the anchor, insert
//! the injected fragments, and overwrite the original script. Every run
//! derives the patch from pristine source, never from a previously patched
//! file, so the operation is safely repeatable across restarts.
//!
//! Concurrent invocations against the same target are not guarded; the tool
//! runs once per Steam client start.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::{info, warn};

use crate::anchor;
use crate::inject;
use crate::pathutil;
use crate::unmin::{UnminError, Unminifier};

/// The one script this tool knows how to patch. Extensible to more targets
/// by the same anchor-and-insert pattern.
pub const LIBRARY_ROOT_SP: &str = "libraryroot~sp.js";

/// Suffix of the pristine backup: `foo.js` → `foo.orig.js`.
const BACKUP_SUFFIX: &str = ".orig";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Fatal pipeline failure. There is no partial-patch recovery path; the
/// caller reruns the whole operation and the idempotency guard takes care of
/// the rest.
#[derive(Debug)]
pub enum PatchError {
    Io {
        context: String,
        source: io::Error,
    },
    Unmin(UnminError),
}

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { context, source } => write!(f, "{context}: {source}"),
            Self::Unmin(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Unmin(e) => Some(e),
        }
    }
}

impl From<UnminError> for PatchError {
    fn from(e: UnminError) -> Self {
        Self::Unmin(e)
    }
}

fn io_context(context: impl Into<String>) -> impl FnOnce(io::Error) -> PatchError {
    let context = context.into();
    move |source| PatchError::Io { context, source }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Patch `libraryroot~sp.js` under the given Steam ui directory.
///
/// `server_port` is the local Crankshaft RPC port the injected bootstrap
/// calls back to. The reload step is separate (see [`crate::cdp`]); a failed
/// reload leaves the patched file intact and the next run restores from
/// backup rather than double-patching.
pub fn patch_client_scripts(
    steamui_path: &Path,
    server_port: u16,
    unminifier: &dyn Unminifier,
) -> Result<(), PatchError> {
    let script_path = steamui_path.join(LIBRARY_ROOT_SP);
    info!("Patching {}", script_path.display());

    let pristine = restore_original_if_patched(&script_path)?;
    if pristine {
        refresh_backup(&script_path)?;
    }

    info!("Unminifying {}", script_path.display());
    let unmin_path = unminifier.unminify(&script_path)?;

    patch_cool_class(&unmin_path, &script_path, server_port)?;

    Ok(())
}

/// Idempotency guard: if the first line of the target carries the patch
/// marker, copy the backup over it so this run starts from pristine source.
/// Skipped when no backup exists yet (first-ever run).
///
/// Returns whether the target now holds unpatched vendor source. The one
/// false case is a marked file with no backup to restore from.
fn restore_original_if_patched(script_path: &Path) -> Result<bool, PatchError> {
    let file = File::open(script_path)
        .map_err(io_context(format!("Failed to open {}", script_path.display())))?;

    let mut first_line = String::new();
    BufReader::new(file)
        .read_line(&mut first_line)
        .map_err(io_context(format!("Failed to read {}", script_path.display())))?;

    if !first_line.contains(inject::PATCH_MARKER) {
        return Ok(true);
    }

    let backup_path = pathutil::add_ext_prefix(script_path, BACKUP_SUFFIX);
    if !backup_path.exists() {
        warn!(
            "{} is already patched but no backup exists; patching on top",
            script_path.display()
        );
        return Ok(false);
    }

    info!(
        "Already patched, restoring original from {}",
        backup_path.display()
    );
    pathutil::copy_file(&backup_path, script_path).map_err(io_context(format!(
        "Failed to restore {} from {}",
        script_path.display(),
        backup_path.display()
    )))?;

    Ok(true)
}

/// Backup store: keep exactly one pristine copy per target, refreshed from
/// the target on every run. The guard has already restored any previous
/// patch, so the backup is only ever overwritten by a fresh original — when
/// Steam ships a new script version, the backup follows it instead of
/// pinning the old one.
fn refresh_backup(script_path: &Path) -> Result<(), PatchError> {
    let backup_path = pathutil::add_ext_prefix(script_path, BACKUP_SUFFIX);

    info!(
        "Copying original {} to {}",
        script_path.display(),
        backup_path.display()
    );
    pathutil::copy_file(script_path, &backup_path).map_err(io_context(format!(
        "Failed to back up {} to {}",
        script_path.display(),
        backup_path.display()
    )))?;

    Ok(())
}

/// Patch writer: locate the anchor in the unminified sibling, insert the
/// injected fragments, and persist by overwriting the original script path.
///
/// The class exposing the internals is minified and its name changes between
/// builds, but it exposes a lot of cool stuff, so we call it coolClass.
fn patch_cool_class(
    unmin_path: &Path,
    orig_path: &Path,
    server_port: u16,
) -> Result<(), PatchError> {
    info!("Patching class in {}", unmin_path.display());

    let mut lines = pathutil::file_lines(unmin_path)
        .map_err(io_context(format!("Failed to read {}", unmin_path.display())))?;

    let anchor = anchor::find_constructor(&lines);
    if anchor.is_none() {
        // Non-fatal: plugins still load, they just can't reach coolClass.
        warn!("coolClass constructor not found, skipping class exposure");
    }

    apply(&mut lines, anchor, &inject::bootstrap_script(server_port));

    info!("Writing patched file to {}", orig_path.display());
    std::fs::write(orig_path, lines.join("\n")).map_err(io_context(format!(
        "Failed to write patched file to {}",
        orig_path.display()
    )))?;

    Ok(())
}

/// Insert the injected fragments into the line buffer.
///
/// The exposure line goes in first, at the anchor index computed against the
/// pre-insertion buffer; the bootstrap goes in at index 0 last, so the
/// anchor index math never has to account for the shift.
fn apply(lines: &mut Vec<String>, anchor: Option<usize>, bootstrap: &str) {
    if let Some(idx) = anchor {
        lines.insert(idx, inject::EXPOSE_LINE.to_string());
    }
    lines.insert(0, bootstrap.to_string());
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
