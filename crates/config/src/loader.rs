use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::WahaConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["waha.toml", "waha.yaml", "waha.yml", "waha.json"];

/// Load config from the given path (any supported format).
///
/// `${VAR}` placeholders are substituted before parsing.
pub fn load_config(path: &Path) -> anyhow::Result<WahaConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./waha.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/waha/waha.{toml,yaml,yml,json}` (user-global)
///
/// Returns `WahaConfig::default()` if no config file is found or it fails to load.
pub fn discover_and_load() -> WahaConfig {
    let Some(path) = find_config_file() else {
        debug!("no config file found, using defaults");
        return WahaConfig::default();
    };

    debug!(path = %path.display(), "loading config");
    match load_config(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            WahaConfig::default()
        },
    }
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    // User-global: ~/.config/waha/
    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory, `~/.config/waha/` on all platforms.
pub fn config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().join(".config").join("waha"))
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<WahaConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
