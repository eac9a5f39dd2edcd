/// Page layout: the tabs, panels and forms the dashboard is built from.
///
/// Element ids are shared with the panel handlers and the HTML renderer, so
/// they live here as constants.
use super::tabs::select_tab;
use super::{Document, Field, FieldKind, Form, Panel, Tab};
use crate::settings::schema::PanelSettings;

pub const METRICS_PANEL: &str = "metrics";
pub const ANALYSIS_PANEL: &str = "analysis";
pub const LIVE_PANEL: &str = "live";
pub const CONFIG_PANEL: &str = "config";

pub const METRICS_FORM: &str = "metrics-form";
pub const METRICS_ENDPOINT: &str = "metrics-endpoint";
pub const METRICS_INSTANCE: &str = "metrics-instance";
pub const METRICS_LIMIT: &str = "metrics-limit";
pub const METRICS_SEARCH: &str = "metrics-search";

pub const ANALYSIS_FORM: &str = "analysis-form";
pub const ANALYSIS_TITLE: &str = "analysis-title";
pub const ANALYSIS_METRICS: &str = "analysis-metrics";
pub const ANALYSIS_ISSUES: &str = "analysis-issues";

pub const LIVE_FORM: &str = "live-form";
pub const LIVE_ENDPOINT: &str = "live-endpoint";
pub const LIVE_LIMIT: &str = "live-limit";

pub const CONFIG_FORM: &str = "config-form";
pub const CONFIG_REFRESH: &str = "config-refresh";

/// Telemetry endpoints served under `/metrics/`.
pub const METRICS_ENDPOINTS: &[&str] = &["wait-stats", "blocking", "logs"];

/// Live DMV endpoints served under `/live/`.
pub const LIVE_ENDPOINTS: &[&str] = &["waits", "blocking", "sessions"];

/// Configuration inputs as `(name, kind)`, grouped by section.
pub const CONFIG_FIELDS: &[(&str, FieldKind)] = &[
    ("elastic.url", FieldKind::Text),
    ("elastic.metrics_index", FieldKind::Text),
    ("elastic.logs_index", FieldKind::Text),
    ("elastic.username", FieldKind::Text),
    ("elastic.password", FieldKind::Password),
    ("elastic.ca_cert", FieldKind::Text),
    ("elastic.insecure", FieldKind::Checkbox),
    ("elastic.request_timeout", FieldKind::Number),
    ("ollama.host", FieldKind::Text),
    ("ollama.model", FieldKind::Text),
    ("ollama.temperature", FieldKind::Number),
    ("ollama.max_tokens", FieldKind::Number),
    ("sqlserver.dsn", FieldKind::Text),
    ("sqlserver.server", FieldKind::Text),
    ("sqlserver.username", FieldKind::Text),
    ("sqlserver.password", FieldKind::Password),
    ("sqlserver.database", FieldKind::Text),
    ("sqlserver.encrypt", FieldKind::Checkbox),
    ("sqlserver.trust_server_certificate", FieldKind::Checkbox),
];

const TABS: &[(&str, &str)] = &[
    (METRICS_PANEL, "Metrics"),
    (ANALYSIS_PANEL, "Analysis"),
    (LIVE_PANEL, "Live"),
    (CONFIG_PANEL, "Configuration"),
];

/// Build the dashboard document with the default tab selected.
pub fn dashboard(panels: &PanelSettings) -> Document {
    let mut doc = Document {
        tabs: TABS
            .iter()
            .map(|(target, label)| Tab {
                target: target.to_string(),
                label: label.to_string(),
                active: false,
            })
            .collect(),
        panels: TABS
            .iter()
            .map(|(id, _)| Panel {
                id: id.to_string(),
                active: false,
            })
            .collect(),
        forms: vec![
            metrics_form(panels.metrics_limit),
            analysis_form(),
            live_form(panels.live_limit),
            config_form(),
        ],
    };
    select_tab(&mut doc, &panels.default_tab);
    doc
}

fn metrics_form(limit: u32) -> Form {
    Form::new(
        METRICS_FORM,
        vec![
            Field::select(METRICS_ENDPOINT, "endpoint", METRICS_ENDPOINTS).with_label("Endpoint"),
            Field::text(METRICS_INSTANCE, "instance").with_label("Instance"),
            Field::new(METRICS_LIMIT, "limit", FieldKind::Number)
                .with_label("Limit")
                .with_value(&limit.to_string()),
            Field::text(METRICS_SEARCH, "q").with_label("Log search"),
        ],
    )
}

fn analysis_form() -> Form {
    Form::new(
        ANALYSIS_FORM,
        vec![
            Field::text(ANALYSIS_TITLE, "title")
                .with_label("Title")
                .with_value("SQL Server Health Report"),
            Field::new(ANALYSIS_METRICS, "metrics", FieldKind::TextArea)
                .with_label("Metrics (JSON)"),
            Field::new(ANALYSIS_ISSUES, "issues", FieldKind::TextArea).with_label("Known issues"),
        ],
    )
}

fn live_form(limit: u32) -> Form {
    Form::new(
        LIVE_FORM,
        vec![
            Field::select(LIVE_ENDPOINT, "endpoint", LIVE_ENDPOINTS).with_label("Endpoint"),
            Field::new(LIVE_LIMIT, "limit", FieldKind::Number)
                .with_label("Limit")
                .with_value(&limit.to_string()),
        ],
    )
}

fn config_form() -> Form {
    let fields = CONFIG_FIELDS
        .iter()
        .map(|(name, kind)| {
            let id = format!("config-{}", name.replace(['.', '_'], "-"));
            Field::new(&id, name, *kind)
        })
        .collect();
    Form::new(CONFIG_FORM, fields)
}
