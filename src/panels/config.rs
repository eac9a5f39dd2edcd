//! Configuration panel: load backend settings into the form and save them
//! back.
//!
//! The backend reads its SQL Server section as `sqlserver` but accepts it on
//! write under the `sqlServer` alias. Form inputs are named
//! `sqlserver.<field>` and only the outgoing body uses the alias.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::{Ticket, is_falsy};
use crate::dom::{FieldKind, Form};
use crate::http::{ApiClient, Method, RequestOptions, Transport};

pub const CONFIG_PATH: &str = "/config";

/// Section keys as returned by `GET /config`, in form order.
pub const SECTIONS: [&str; 3] = ["elastic", "ollama", "sqlserver"];

// ---------------------------------------------------------------------------
// Status indicator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusKind {
    #[default]
    Info,
    Success,
    Error,
}

impl StatusKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLine {
    pub message: String,
    pub kind: StatusKind,
}

/// Status line of the configuration panel, with the same stale-response
/// guard as [`super::PanelView`].
#[derive(Debug, Clone, Default)]
pub struct ConfigView {
    status: StatusLine,
    generation: u64,
}

impl ConfigView {
    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    fn begin(&mut self, message: &str) -> Ticket {
        self.generation += 1;
        self.set(message.to_string(), StatusKind::Info);
        Ticket(self.generation)
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        let current = ticket.0 == self.generation;
        if !current {
            debug!(
                ticket = ticket.0,
                current = self.generation,
                "discarding stale config response"
            );
        }
        current
    }

    fn set(&mut self, message: String, kind: StatusKind) {
        self.status = StatusLine { message, kind };
    }
}

// ---------------------------------------------------------------------------
// Form population
// ---------------------------------------------------------------------------

/// Flatten the three configuration sections into `section.field` keys.
/// Missing or non-object sections contribute nothing.
pub fn flatten(config: &Value) -> BTreeMap<String, Value> {
    let mut entries = BTreeMap::new();
    for section in SECTIONS {
        if let Some(fields) = config.get(section).and_then(Value::as_object) {
            for (field, value) in fields {
                entries.insert(format!("{section}.{field}"), value.clone());
            }
        }
    }
    entries
}

/// Write configuration values into every named input of `form`.
///
/// Checkboxes take the truthiness of their value; other inputs take the
/// value as text, or are cleared when the key is absent or null. A falsy
/// `config` (`null`, `false`, `0`, `""`) leaves the form untouched.
pub fn populate_form(form: &mut Form, config: &Value) {
    if is_falsy(config) {
        return;
    }
    let entries = flatten(config);

    for field in form.fields.iter_mut() {
        if !field.kind.is_input() || field.name.is_empty() {
            continue;
        }
        let entry = entries.get(&field.name);
        if field.kind == FieldKind::Checkbox {
            field.checked = entry.is_some_and(|v| !is_falsy(v));
        } else {
            field.value = match entry {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            };
        }
    }
}

// ---------------------------------------------------------------------------
// Form collection
// ---------------------------------------------------------------------------

/// Values collected from the form, grouped by section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigPayload {
    pub elastic: Map<String, Value>,
    pub ollama: Map<String, Value>,
    pub sqlserver: Map<String, Value>,
}

impl ConfigPayload {
    fn section_mut(&mut self, section: &str) -> Option<&mut Map<String, Value>> {
        match section {
            "elastic" => Some(&mut self.elastic),
            "ollama" => Some(&mut self.ollama),
            "sqlserver" => Some(&mut self.sqlserver),
            _ => None,
        }
    }

    /// Body for `PUT /config`.
    pub fn into_update(self) -> ConfigUpdate {
        ConfigUpdate {
            elastic: self.elastic,
            ollama: self.ollama,
            sql_server: self.sqlserver,
        }
    }
}

/// Wire shape of a configuration update.
#[derive(Debug, Serialize)]
pub struct ConfigUpdate {
    pub elastic: Map<String, Value>,
    pub ollama: Map<String, Value>,
    #[serde(rename = "sqlServer")]
    pub sql_server: Map<String, Value>,
}

/// Gather named inputs of the form into their sections.
///
/// Checkboxes always contribute a boolean; other inputs contribute their
/// trimmed text when non-empty. Names that do not split into a known
/// `section.field` pair are skipped.
pub fn collect_form_values(form: &Form) -> ConfigPayload {
    let mut payload = ConfigPayload::default();

    for field in &form.fields {
        if !field.kind.is_input() {
            continue;
        }
        let mut parts = field.name.split('.');
        let (Some(section), Some(key)) = (parts.next(), parts.next()) else {
            continue;
        };
        if section.is_empty() || key.is_empty() {
            continue;
        }
        let Some(target) = payload.section_mut(section) else {
            debug!(name = %field.name, "skipping field outside known config sections");
            continue;
        };

        if field.kind == FieldKind::Checkbox {
            target.insert(key.to_string(), Value::Bool(field.checked));
        } else {
            let value = field.value.trim();
            if !value.is_empty() {
                target.insert(key.to_string(), Value::String(value.to_string()));
            }
        }
    }

    payload
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Fetch the configuration and populate the form. On failure the form is
/// left as it was.
pub fn load<T: Transport>(form: &mut Form, view: &mut ConfigView, client: &ApiClient<T>) {
    let ticket = view.begin("Loading configuration...");
    let result = client.fetch_json(CONFIG_PATH, RequestOptions::default());
    if !view.is_current(ticket) {
        return;
    }
    match result {
        Ok(config) => {
            populate_form(form, &config);
            view.set("Configuration loaded".to_string(), StatusKind::Success);
        }
        Err(e) => view.set(format!("Error loading config: {e}"), StatusKind::Error),
    }
}

/// Collect the form, PUT it, and repopulate from the server's echo. On
/// failure the form keeps the user's edits.
pub fn save<T: Transport>(form: &mut Form, view: &mut ConfigView, client: &ApiClient<T>) {
    let update = collect_form_values(form).into_update();
    let ticket = view.begin("Saving configuration...");

    let result = serde_json::to_value(&update)
        .map_err(|e| e.to_string())
        .and_then(|body| {
            client
                .fetch_json(CONFIG_PATH, RequestOptions::with_json(Method::Put, &body))
                .map_err(|e| e.to_string())
        });
    if !view.is_current(ticket) {
        return;
    }
    match result {
        Ok(updated) => {
            populate_form(form, &updated);
            view.set("Configuration saved".to_string(), StatusKind::Success);
        }
        Err(message) => view.set(format!("Error saving config: {message}"), StatusKind::Error),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::dom::{Field, FieldKind};

    fn form() -> Form {
        Form::new(
            "config-form",
            vec![
                Field::text("e-host", "elastic.host"),
                Field::text("o-model", "ollama.model"),
                Field::text("s-user", "sqlserver.user"),
                Field::text("e-extra", "elastic.extra").with_value("stale"),
                Field::checkbox("s-encrypt", "sqlserver.encrypt"),
                Field::new("notes", "elastic.notes", FieldKind::TextArea).with_value("keep"),
            ],
        )
    }

    #[test]
    fn flatten_uses_dotted_keys() {
        let entries = flatten(&json!({
            "elastic": {"host": "a"},
            "ollama": {"model": "b"},
            "sqlserver": {"user": "c"},
            "other": {"x": 1}
        }));
        let keys: Vec<_> = entries.keys().cloned().collect();
        assert_eq!(keys, ["elastic.host", "ollama.model", "sqlserver.user"]);
    }

    #[test]
    fn populate_sets_and_clears_inputs() {
        let mut form = form();
        populate_form(
            &mut form,
            &json!({
                "elastic": {"host": "a"},
                "ollama": {"model": "b"},
                "sqlserver": {"user": "c", "encrypt": true}
            }),
        );
        assert_eq!(form.value_of("e-host"), "a");
        assert_eq!(form.value_of("o-model"), "b");
        assert_eq!(form.value_of("s-user"), "c");
        assert_eq!(form.value_of("e-extra"), "");
        assert!(form.field("s-encrypt").unwrap().checked);
        // Text areas are not inputs and are left alone.
        assert_eq!(form.value_of("notes"), "keep");
    }

    #[test]
    fn populate_stringifies_scalars() {
        let mut form = Form::new("f", vec![Field::text("t", "elastic.request_timeout")]);
        populate_form(&mut form, &json!({"elastic": {"request_timeout": 60}}));
        assert_eq!(form.value_of("t"), "60");
    }

    #[test]
    fn populate_ignores_falsy_config() {
        for config in [Value::Null, json!(false), json!(0), json!("")] {
            let mut form = form();
            populate_form(&mut form, &config);
            assert_eq!(form.value_of("e-extra"), "stale", "{config}");
        }
    }

    #[test]
    fn collect_groups_by_section() {
        let mut form = form();
        form.set_value("e-host", "  es:9200 ");
        form.set_value("s-user", "sa");
        form.set_value("e-extra", "   ");
        form.field_mut("s-encrypt").unwrap().checked = true;

        let payload = collect_form_values(&form);
        assert_eq!(payload.elastic.get("host"), Some(&json!("es:9200")));
        assert!(!payload.elastic.contains_key("extra"));
        assert!(!payload.elastic.contains_key("notes"));
        assert!(payload.ollama.is_empty());
        assert_eq!(payload.sqlserver.get("user"), Some(&json!("sa")));
        assert_eq!(payload.sqlserver.get("encrypt"), Some(&json!(true)));
    }

    #[test]
    fn collect_skips_unknown_sections_and_bare_names() {
        let form = Form::new(
            "f",
            vec![
                Field::text("a", "redis.host").with_value("x"),
                Field::text("b", "host").with_value("x"),
                Field::text("c", "ollama.").with_value("x"),
            ],
        );
        assert_eq!(collect_form_values(&form), ConfigPayload::default());
    }

    #[test]
    fn update_uses_camel_case_sql_key() {
        let mut payload = ConfigPayload::default();
        payload.sqlserver.insert("user".into(), json!("c"));
        let body = serde_json::to_value(payload.into_update()).unwrap();
        assert_eq!(body["sqlServer"]["user"], "c");
        assert!(body.get("sqlserver").is_none());
        assert!(body["elastic"].as_object().unwrap().is_empty());
    }
}
