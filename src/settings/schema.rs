/// Settings schema and defaults for the sqlpulse client.
///
/// Sections: `[api]`, `[web]`, `[panels]`, `[logging]`. Every field has a
/// built-in default, so a settings file only needs the keys it overrides.
use serde::{Deserialize, Serialize};

/// Top-level client settings, as stored in `~/.sqlpulse/config.toml` and
/// `.sqlpulse.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub web: WebSettings,
    pub panels: PanelSettings,
    pub logging: LoggingSettings,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Where the observability API lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL every request path is appended to.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_ms: 30_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSettings {
    /// Listen address for `sqlpulse web`.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9750".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [panels]
// ---------------------------------------------------------------------------

/// Initial dashboard state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSettings {
    /// Panel selected when the dashboard opens.
    pub default_tab: String,
    pub metrics_limit: u32,
    pub live_limit: u32,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            default_tab: "metrics".to_string(),
            metrics_limit: 50,
            live_limit: 25,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Annotated default settings file written by `sqlpulse settings init`.
    pub fn default_toml() -> String {
        let defaults = Self::default();
        format!(
            r#"# sqlpulse client settings
#
# Precedence: built-in defaults < ~/.sqlpulse/config.toml < ./.sqlpulse.toml
# < SQLPULSE_* environment variables.

[api]
# Base URL of the observability API.
base_url = "{base_url}"
# Request timeout in milliseconds.
timeout_ms = {timeout_ms}

[web]
# Listen address for `sqlpulse web`.
addr = "{addr}"
open_browser = {open_browser}

[panels]
# One of: metrics, analysis, live, config
default_tab = "{default_tab}"
metrics_limit = {metrics_limit}
live_limit = {live_limit}

[logging]
# tracing filter directive, e.g. "info" or "sqlpulse=debug".
level = "{level}"
"#,
            base_url = defaults.api.base_url,
            timeout_ms = defaults.api.timeout_ms,
            addr = defaults.web.addr,
            open_browser = defaults.web.open_browser,
            default_tab = defaults.panels.default_tab,
            metrics_limit = defaults.panels.metrics_limit,
            live_limit = defaults.panels.live_limit,
            level = defaults.logging.level,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_parses_back_to_defaults() {
        let parsed: Settings = toml::from_str(&Settings::default_toml()).unwrap();
        assert_eq!(parsed, Settings::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let parsed: Settings = toml::from_str(
            r#"
[api]
base_url = "http://sql-obs:8000"
"#,
        )
        .unwrap();
        assert_eq!(parsed.api.base_url, "http://sql-obs:8000");
        assert_eq!(parsed.api.timeout_ms, 30_000);
        assert_eq!(parsed.panels, PanelSettings::default());
    }
}
