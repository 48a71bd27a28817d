//! Default filesystem locations, used as CLI defaults so the common case
//! needs no arguments.

use std::path::PathBuf;

/// Locate the Steam ui directory holding the client scripts.
///
/// Prefers the native install, falls back to the Flatpak location, and
/// returns the native path (even if absent) when neither exists so error
/// messages point somewhere sensible.
pub fn default_steamui_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

    let native = home.join(".local/share/Steam/steamui");
    if native.exists() {
        return native;
    }

    let flatpak = home.join(".var/app/com.valvesoftware.Steam/.local/share/Steam/steamui");
    if flatpak.exists() {
        return flatpak;
    }

    native
}

/// Directory plugins are installed into: `{data_dir}/crankshaft/plugins`.
pub fn default_plugins_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("crankshaft")
        .join("plugins")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steamui_path_points_into_a_steam_install() {
        let path = default_steamui_path();
        assert!(path.ends_with("Steam/steamui"), "{path:?}");
    }

    #[test]
    fn plugins_dir_is_under_crankshaft_data() {
        let path = default_plugins_dir();
        assert!(path.ends_with("crankshaft/plugins"), "{path:?}");
    }
}
