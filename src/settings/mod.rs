/// Client settings for sqlpulse.
///
/// Layered resolution, later layers winning at the key level:
///
/// 1. **Built-in defaults** from [`schema::Settings::default()`]
/// 2. **User global file** at `~/.sqlpulse/config.toml`
/// 3. **Project file** at `.sqlpulse.toml` in the current directory
/// 4. **Environment variables** `SQLPULSE_*`
///
/// These settings describe the client only (where the API is, how the
/// dashboard starts). The backend's own configuration is edited through the
/// configuration panel, not here.
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

pub use schema::Settings;

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load the fully resolved settings.
pub fn load() -> Settings {
    let mut settings = load_layers(&[global_settings_path(), project_settings_path()]);
    apply_env_overrides(&mut settings);
    settings
}

/// Merge defaults with each existing settings file, in order.
///
/// Files are merged as TOML tables so a file only overrides the keys it
/// names. Unreadable or malformed files are skipped with a warning.
pub fn load_layers(paths: &[Option<PathBuf>]) -> Settings {
    let mut merged = match toml::Value::try_from(Settings::default()) {
        Ok(value) => value,
        Err(_) => return Settings::default(),
    };

    for path in paths.iter().flatten() {
        if let Some(layer) = read_toml_file(path) {
            merge_tables(&mut merged, layer);
        }
    }

    merged.try_into().unwrap_or_else(|e| {
        warn!(error = %e, "settings do not match schema, using defaults");
        Settings::default()
    })
}

fn read_toml_file(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring malformed settings file");
            None
        }
    }
}

/// Recursively overlay `overlay` onto `base`.
fn merge_tables(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_tables(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

fn global_settings_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".sqlpulse").join("config.toml"))
}

fn project_settings_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".sqlpulse.toml"))
}

/// Path of the global settings file, for display and init.
pub fn global_settings_file() -> Option<PathBuf> {
    global_settings_path()
}

/// Path of the project settings file, for display.
pub fn project_settings_file() -> Option<PathBuf> {
    project_settings_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `SQLPULSE_API_URL` — API base URL
/// - `SQLPULSE_TIMEOUT_MS` — request timeout
/// - `SQLPULSE_WEB_ADDR` — dashboard listen address
/// - `SQLPULSE_OPEN_BROWSER` — `1`/`true`/`yes`/`on` to open a browser
/// - `SQLPULSE_LOG` — logging filter directive
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("SQLPULSE_API_URL")
        && !val.is_empty()
    {
        settings.api.base_url = val;
    }
    if let Ok(val) = std::env::var("SQLPULSE_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        settings.api.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("SQLPULSE_WEB_ADDR")
        && !val.is_empty()
    {
        settings.web.addr = val;
    }
    if let Ok(val) = std::env::var("SQLPULSE_OPEN_BROWSER") {
        settings.web.open_browser = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("SQLPULSE_LOG")
        && !val.is_empty()
    {
        settings.logging.level = val;
    }
}

/// Check if a string value represents a truthy boolean.
pub fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Init / set / reset
// ---------------------------------------------------------------------------

/// Write the annotated default settings to `~/.sqlpulse/config.toml`.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn init_settings(force: bool) -> Result<PathBuf> {
    let path = global_settings_path().context("could not determine home directory")?;
    init_settings_at(&path, force)?;
    Ok(path)
}

/// Write the annotated defaults to an explicit path.
pub fn init_settings_at(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "settings file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create settings directory")?;
    }
    fs::write(path, Settings::default_toml()).context("failed to write settings file")?;
    Ok(())
}

/// Set one dotted key (e.g. `api.base_url`) in the global settings file.
pub fn set_setting_value(key: &str, value: &str) -> Result<()> {
    let path = global_settings_path().context("could not determine home directory")?;
    set_setting_value_at(&path, key, value)
}

/// Set one dotted key in the settings file at `path`, creating it from the
/// defaults when missing. The new value keeps the type of the old one.
pub fn set_setting_value_at(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut root: toml::Value = if path.exists() {
        let content = fs::read_to_string(path).context("failed to read settings file")?;
        toml::from_str(&content).context("failed to parse settings as TOML")?
    } else {
        toml::Value::try_from(Settings::default()).context("failed to serialize defaults")?
    };

    // Fill in sections the file omits so any schema key can be set.
    let mut full =
        toml::Value::try_from(Settings::default()).context("failed to serialize defaults")?;
    merge_tables(&mut full, root.clone());
    let existing = lookup(&full, key).cloned();
    set_toml_value(&mut root, key, value, existing.as_ref())?;

    // Reject values that would make the file unloadable.
    merge_tables(&mut full, root.clone());
    full.try_into::<Settings>()
        .with_context(|| format!("invalid value for '{key}': '{value}'"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize settings")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create settings directory")?;
    }
    fs::write(path, output).context("failed to write settings file")?;
    Ok(())
}

fn lookup<'a>(root: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.').try_fold(root, |node, part| node.get(part))
}

/// Set `key` in `root`, parsing `raw_value` according to the type of
/// `existing` (the value the key currently resolves to).
fn set_toml_value(
    root: &mut toml::Value,
    key: &str,
    raw_value: &str,
    existing: Option<&toml::Value>,
) -> Result<()> {
    let Some((section, leaf)) = key.split_once('.') else {
        anyhow::bail!("settings key must be 'section.key', got '{key}'");
    };
    if existing.is_none() {
        anyhow::bail!("unknown settings key: '{key}'");
    }

    let new_value = match existing {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    let table = root
        .as_table_mut()
        .context("settings root is not a table")?
        .entry(section.to_string())
        .or_insert_with(|| toml::Value::Table(toml::map::Map::new()))
        .as_table_mut()
        .with_context(|| format!("expected table at '{section}'"))?;
    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global settings file to defaults.
pub fn reset_settings() -> Result<PathBuf> {
    init_settings(true)
}

/// Effective (fully resolved) settings as TOML.
pub fn show_effective_settings() -> Result<String> {
    toml::to_string_pretty(&load()).context("failed to serialize effective settings")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn is_truthy_accepts_variants() {
        for val in ["1", "true", "TRUE", "yes", "on", "ON"] {
            assert!(is_truthy(val), "{val}");
        }
        for val in ["0", "false", "no", "off", ""] {
            assert!(!is_truthy(val), "{val}");
        }
    }

    #[test]
    fn later_layers_override_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let global = write(
            dir.path(),
            "global.toml",
            "[api]\nbase_url = \"http://global:8000\"\ntimeout_ms = 1000\n",
        );
        let project = write(dir.path(), "project.toml", "[api]\ntimeout_ms = 2000\n");

        let settings = load_layers(&[Some(global), Some(project)]);
        assert_eq!(settings.api.base_url, "http://global:8000");
        assert_eq!(settings.api.timeout_ms, 2000);
        assert_eq!(settings.web, schema::WebSettings::default());
    }

    #[test]
    fn missing_and_malformed_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let broken = write(dir.path(), "broken.toml", "[api\nbase_url = ");
        let settings = load_layers(&[None, Some(dir.path().join("absent.toml")), Some(broken)]);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn set_value_creates_file_and_keeps_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        set_setting_value_at(&path, "api.timeout_ms", "1500").unwrap();
        set_setting_value_at(&path, "web.open_browser", "off").unwrap();
        set_setting_value_at(&path, "panels.default_tab", "live").unwrap();

        let settings = load_layers(&[Some(path)]);
        assert_eq!(settings.api.timeout_ms, 1500);
        assert!(!settings.web.open_browser);
        assert_eq!(settings.panels.default_tab, "live");
    }

    #[test]
    fn set_value_fills_missing_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "config.toml", "[api]\ntimeout_ms = 5\n");
        set_setting_value_at(&path, "logging.level", "debug").unwrap();

        let settings = load_layers(&[Some(path)]);
        assert_eq!(settings.api.timeout_ms, 5);
        assert_eq!(settings.logging.level, "debug");
    }

    #[test]
    fn set_value_rejects_unknown_key_and_bad_integer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(set_setting_value_at(&path, "nope.key", "x").is_err());
        assert!(set_setting_value_at(&path, "api", "x").is_err());
        assert!(set_setting_value_at(&path, "panels.live_limit", "many").is_err());
        assert!(set_setting_value_at(&path, "panels.live_limit", "-1").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        init_settings_at(&path, false).unwrap();
        assert!(init_settings_at(&path, false).is_err());
        init_settings_at(&path, true).unwrap();
        assert_eq!(load_layers(&[Some(path)]), Settings::default());
    }

    /// Wraps the `unsafe` env mutation. Only the env test below calls it.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) }
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    // Every case that touches `SQLPULSE_*` lives in this one test so parallel
    // tests never observe each other's variables.
    #[test]
    fn env_overrides_beat_files_and_skip_bad_values() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(
            dir.path(),
            "config.toml",
            "[api]\nbase_url = \"http://file:1\"\ntimeout_ms = 5\n[web]\naddr = \"127.0.0.1:1\"\n",
        );
        let keys = [
            "SQLPULSE_API_URL",
            "SQLPULSE_TIMEOUT_MS",
            "SQLPULSE_WEB_ADDR",
            "SQLPULSE_OPEN_BROWSER",
            "SQLPULSE_LOG",
        ];

        unsafe {
            set_env("SQLPULSE_API_URL", "http://env:2");
            set_env("SQLPULSE_TIMEOUT_MS", "77");
            set_env("SQLPULSE_WEB_ADDR", "0.0.0.0:9000");
            set_env("SQLPULSE_OPEN_BROWSER", "no");
            set_env("SQLPULSE_LOG", "debug");
        }
        let mut settings = load_layers(&[Some(file.clone())]);
        apply_env_overrides(&mut settings);
        assert_eq!(settings.api.base_url, "http://env:2");
        assert_eq!(settings.api.timeout_ms, 77);
        assert_eq!(settings.web.addr, "0.0.0.0:9000");
        assert!(!settings.web.open_browser);
        assert_eq!(settings.logging.level, "debug");

        // Empty and unparsable values leave the file layer in place.
        unsafe {
            set_env("SQLPULSE_API_URL", "");
            set_env("SQLPULSE_TIMEOUT_MS", "soon");
            set_env("SQLPULSE_WEB_ADDR", "");
            set_env("SQLPULSE_LOG", "");
        }
        let mut settings = load_layers(&[Some(file)]);
        apply_env_overrides(&mut settings);
        assert_eq!(settings.api.base_url, "http://file:1");
        assert_eq!(settings.api.timeout_ms, 5);
        assert_eq!(settings.web.addr, "127.0.0.1:1");
        assert_eq!(settings.logging.level, Settings::default().logging.level);

        for key in keys {
            unsafe { remove_env(key) };
        }
    }
}
