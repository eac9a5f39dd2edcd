//! CLI command implementations for sqlpulse.
//!
//! Each panel command fills the same dashboard form the web page uses and
//! submits it, so the terminal and the browser share one code path:
//! - `sqlpulse metrics` / `live` / `analyze` — request panels
//! - `sqlpulse config show|set` — backend configuration panel
//! - `sqlpulse settings show|init|set|reset|path` — local client settings
//! - `sqlpulse web` — serve the dashboard

use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::{Map, Value};

use crate::dashboard::{Dashboard, Event};
use crate::dom::FieldKind;
use crate::dom::layout::{
    ANALYSIS_FORM, ANALYSIS_ISSUES, ANALYSIS_METRICS, ANALYSIS_PANEL, ANALYSIS_TITLE, CONFIG_FORM,
    LIVE_ENDPOINT, LIVE_FORM, LIVE_LIMIT, LIVE_PANEL, METRICS_ENDPOINT, METRICS_FORM,
    METRICS_INSTANCE, METRICS_LIMIT, METRICS_PANEL, METRICS_SEARCH,
};
use crate::http::{ApiClient, Transport, UreqTransport};
use crate::panels::PanelState;
use crate::panels::config::StatusKind;
use crate::settings::{self, Settings, is_truthy};
use crate::web;

/// Output format for `config show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

/// Build a dashboard talking to the configured API over HTTP.
pub fn connect(settings: &Settings) -> Dashboard<UreqTransport> {
    let transport = UreqTransport::new(Duration::from_millis(settings.api.timeout_ms));
    let client = ApiClient::new(&settings.api.base_url, transport);
    Dashboard::new(client, &settings.panels)
}

// ---------------------------------------------------------------------------
// Panel submission
// ---------------------------------------------------------------------------

/// Fill `form_id` with `values` (field id, value), submit it, and return the
/// panel's rendered output. A panel that ends in an error state becomes
/// `Err` carrying the rendered `Error: ...` text.
pub fn submit_panel<T: Transport>(
    dashboard: &mut Dashboard<T>,
    form_id: &str,
    panel: &str,
    values: &[(&str, &str)],
) -> Result<String> {
    let form = dashboard
        .form_mut(form_id)
        .with_context(|| format!("unknown form '{form_id}'"))?;
    for (field, value) in values {
        if !form.set_value(field, value) {
            anyhow::bail!("form '{form_id}' has no field '{field}'");
        }
    }

    dashboard.dispatch(Event::Submit(form_id.to_string()));

    let view = dashboard
        .view(panel)
        .with_context(|| format!("unknown panel '{panel}'"))?;
    match view.state() {
        PanelState::Error(_) => anyhow::bail!(view.text()),
        _ => Ok(view.text()),
    }
}

fn print_panel(title: &str, result: Result<String>) -> Result<()> {
    println!("{}", title.bold().cyan());
    println!("{}", "=".repeat(50));
    match result {
        Ok(text) => {
            println!("{text}");
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            Err(anyhow::anyhow!("{title} request failed"))
        }
    }
}

/// `sqlpulse metrics <endpoint>`
pub fn run_metrics(
    settings: &Settings,
    endpoint: &str,
    instance: Option<&str>,
    limit: Option<u32>,
    search: Option<&str>,
) -> Result<()> {
    let limit = limit.unwrap_or(settings.panels.metrics_limit).to_string();
    let mut dashboard = connect(settings);
    let result = submit_panel(
        &mut dashboard,
        METRICS_FORM,
        METRICS_PANEL,
        &[
            (METRICS_ENDPOINT, endpoint),
            (METRICS_INSTANCE, instance.unwrap_or("")),
            (METRICS_LIMIT, &limit),
            (METRICS_SEARCH, search.unwrap_or("")),
        ],
    );
    print_panel(&format!("Metrics: {endpoint}"), result)
}

/// `sqlpulse live <endpoint>`
pub fn run_live(settings: &Settings, endpoint: &str, limit: Option<u32>) -> Result<()> {
    let limit = limit.unwrap_or(settings.panels.live_limit).to_string();
    let mut dashboard = connect(settings);
    let result = submit_panel(
        &mut dashboard,
        LIVE_FORM,
        LIVE_PANEL,
        &[(LIVE_ENDPOINT, endpoint), (LIVE_LIMIT, &limit)],
    );
    print_panel(&format!("Live: {endpoint}"), result)
}

/// `sqlpulse analyze`
pub fn run_analyze(
    settings: &Settings,
    title: Option<&str>,
    metrics: Option<&str>,
    metrics_file: Option<&std::path::Path>,
    issues: Option<&str>,
) -> Result<()> {
    let metrics_text = match (metrics, metrics_file) {
        (Some(text), _) => text.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read metrics file {}", path.display()))?,
        (None, None) => String::new(),
    };

    let mut dashboard = connect(settings);
    let mut values = vec![
        (ANALYSIS_METRICS, metrics_text.as_str()),
        (ANALYSIS_ISSUES, issues.unwrap_or("")),
    ];
    if let Some(title) = title {
        values.push((ANALYSIS_TITLE, title));
    }
    let result = submit_panel(&mut dashboard, ANALYSIS_FORM, ANALYSIS_PANEL, &values);
    print_panel("Analysis", result)
}

// ---------------------------------------------------------------------------
// Backend configuration
// ---------------------------------------------------------------------------

/// Load the configuration panel, failing if the load did not succeed.
pub fn load_config_panel<T: Transport>(dashboard: &mut Dashboard<T>) -> Result<()> {
    dashboard.dispatch(Event::PageLoad);
    let status = dashboard.config_status();
    if status.kind == StatusKind::Error {
        anyhow::bail!(status.message.clone());
    }
    Ok(())
}

/// Current configuration form as `(name, display value)` rows.
/// Passwords are masked.
pub fn config_rows<T: Transport>(dashboard: &Dashboard<T>) -> Vec<(String, String)> {
    let Some(form) = dashboard.document().form(CONFIG_FORM) else {
        return Vec::new();
    };
    form.fields
        .iter()
        .map(|field| {
            let value = match field.kind {
                FieldKind::Checkbox => field.checked.to_string(),
                FieldKind::Password if !field.value.is_empty() => "********".to_string(),
                _ => field.value.clone(),
            };
            (field.name.clone(), value)
        })
        .collect()
}

/// Apply `section.field=value` assignments to the loaded form and save it.
/// Returns the final status message.
pub fn apply_config_assignments<T: Transport>(
    dashboard: &mut Dashboard<T>,
    assignments: &[String],
) -> Result<String> {
    let form = dashboard
        .form_mut(CONFIG_FORM)
        .context("dashboard has no configuration form")?;

    for assignment in assignments {
        let (name, value) = assignment
            .split_once('=')
            .with_context(|| format!("expected section.field=value, got '{assignment}'"))?;
        let field = form
            .field_by_name_mut(name.trim())
            .with_context(|| format!("unknown configuration field '{}'", name.trim()))?;
        if field.kind == FieldKind::Checkbox {
            field.checked = is_truthy(value.trim());
        } else {
            field.value = value.to_string();
        }
    }

    dashboard.dispatch(Event::Submit(CONFIG_FORM.to_string()));
    let status = dashboard.config_status();
    match status.kind {
        StatusKind::Error => anyhow::bail!(status.message.clone()),
        _ => Ok(status.message.clone()),
    }
}

/// `sqlpulse config show`
pub fn run_config_show(settings: &Settings, format: OutputFormat) -> Result<()> {
    let mut dashboard = connect(settings);
    load_config_panel(&mut dashboard)?;
    let rows = config_rows(&dashboard);

    match format {
        OutputFormat::Json => {
            let map: Map<String, Value> = rows
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
        OutputFormat::Table => {
            println!("{}", "Backend Configuration".bold().cyan());
            println!("{}", "=".repeat(60));
            for (i, (name, value)) in rows.iter().enumerate() {
                let line = format!("  {:<40} {}", name, value);
                if i % 2 == 0 {
                    println!("{line}");
                } else {
                    println!("{}", line.dimmed());
                }
            }
        }
    }
    Ok(())
}

/// `sqlpulse config set section.field=value ...`
pub fn run_config_set(settings: &Settings, assignments: &[String]) -> Result<()> {
    let mut dashboard = connect(settings);
    load_config_panel(&mut dashboard)?;
    let message = apply_config_assignments(&mut dashboard, assignments)?;
    println!("{} {}", "✓".green().bold(), message);
    Ok(())
}

// ---------------------------------------------------------------------------
// Dashboard server
// ---------------------------------------------------------------------------

/// `sqlpulse web`
pub fn run_web(settings: &Settings, addr: Option<&str>, no_open: bool) -> Result<()> {
    let addr = addr.unwrap_or(&settings.web.addr);
    web::serve(addr, connect(settings), settings.web.open_browser && !no_open)
}

// ---------------------------------------------------------------------------
// Local settings
// ---------------------------------------------------------------------------

/// Show the effective (merged) settings as TOML.
pub fn run_settings_show() -> Result<()> {
    let toml_str = settings::show_effective_settings()?;
    println!("{}", "Effective sqlpulse Settings".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = settings::global_settings_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = settings::project_settings_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.sqlpulse/config.toml", global_exists);
    print_source(".sqlpulse.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "SQLPULSE_* environment variables".dimmed()
    );
    Ok(())
}

fn print_source(label: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), label.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{label} (not found)").dimmed());
    }
}

/// Write default settings to `~/.sqlpulse/config.toml`.
pub fn run_settings_init(force: bool) -> Result<()> {
    let path = settings::init_settings(force)?;
    println!(
        "{} Settings written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

pub fn run_settings_set(key: &str, value: &str) -> Result<()> {
    settings::set_setting_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

pub fn run_settings_reset() -> Result<()> {
    let path = settings::reset_settings()?;
    println!(
        "{} Settings reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

pub fn run_settings_path() -> Result<()> {
    let path = settings::global_settings_file().context("could not determine home directory")?;
    println!("{}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
