//! External binary resolution with caching.
//!
//! Crankshaft is often launched from a desktop session or systemd unit that
//! doesn't inherit the user's shell PATH, so npm-installed tools like
//! `js-beautify` aren't found. This module probes well-known directories and
//! caches the results for the lifetime of the process.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Well-known directories where CLI tools live but that non-shell-launched
/// processes don't have on PATH. Computed once and cached via OnceLock.
fn extra_bin_dirs() -> &'static [String] {
    static DIRS: OnceLock<Vec<String>> = OnceLock::new();
    DIRS.get_or_init(|| {
        let home = std::env::var("HOME").unwrap_or_default();

        let mut dirs = vec![
            "/usr/bin".to_string(),
            "/usr/local/bin".to_string(),
            format!("{home}/.local/bin"),
            format!("{home}/.npm-global/bin"),
            format!("{home}/node_modules/.bin"),
        ];

        #[cfg(target_os = "macos")]
        {
            dirs.extend([
                "/opt/homebrew/bin".to_string(),
                "/opt/homebrew/sbin".to_string(),
            ]);
        }

        dirs
    })
}

/// Resolve a CLI binary to its full path, probing well-known directories.
///
/// Results are cached per binary name — tool locations don't change at
/// runtime. Returns the bare name unchanged when nothing is found, letting
/// the subsequent spawn fail with a clear "not found" error.
pub(crate) fn resolve_cli(name: &str) -> String {
    static CACHE: OnceLock<parking_lot::Mutex<HashMap<String, String>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| parking_lot::Mutex::new(HashMap::new()));

    {
        let guard = cache.lock();
        if let Some(cached) = guard.get(name) {
            return cached.clone();
        }
    }

    let resolved = resolve_cli_uncached(name);

    {
        let mut guard = cache.lock();
        guard.insert(name.to_string(), resolved.clone());
    }

    resolved
}

fn resolve_cli_uncached(name: &str) -> String {
    for dir in extra_bin_dirs() {
        let candidate = std::path::Path::new(dir).join(name);
        if candidate.exists() {
            return candidate.to_string_lossy().to_string();
        }
    }
    name.to_string()
}
