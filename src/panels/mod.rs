//! Panel handlers and their view state.
//!
//! Each request panel (metrics, analysis, live) turns its form into a
//! [`PanelRequest`], runs it through the [`ApiClient`] and records the
//! outcome in a [`PanelView`]. Rendering is a pure function of the view
//! state, see [`render`].

pub mod analysis;
pub mod config;
pub mod live;
pub mod metrics;

use serde_json::Value;
use tracing::debug;

use crate::http::{ApiClient, RequestError, RequestOptions, Transport};

/// Placeholder shown while a request is in flight.
pub const LOADING_TEXT: &str = "Loading...";

/// Shown for empty or falsy results.
pub const NO_DATA_TEXT: &str = "No data";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a panel submission failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Request(#[from] RequestError),
    /// A free-text JSON field did not parse.
    #[error("invalid metrics JSON: {0}")]
    InvalidJson(String),
}

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

/// What a panel's output area currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PanelState {
    #[default]
    Idle,
    Loading,
    Success(Value),
    Error(String),
}

/// Identifies one submission. Only the most recent ticket may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Per-panel view state guarded by a generation counter, so a response to
/// an older submission cannot overwrite a newer one.
#[derive(Debug, Clone, Default)]
pub struct PanelView {
    state: PanelState,
    generation: u64,
}

impl PanelView {
    pub fn state(&self) -> &PanelState {
        &self.state
    }

    /// Start a submission: bump the generation and show the loading state.
    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.state = PanelState::Loading;
        Ticket(self.generation)
    }

    /// Record the outcome of the submission identified by `ticket`.
    ///
    /// Returns `false` and leaves the state untouched when a newer
    /// submission has started since.
    pub fn complete(&mut self, ticket: Ticket, result: Result<Value, String>) -> bool {
        if ticket.0 != self.generation {
            debug!(
                ticket = ticket.0,
                current = self.generation,
                "discarding stale response"
            );
            return false;
        }
        self.state = match result {
            Ok(data) => PanelState::Success(data),
            Err(message) => PanelState::Error(message),
        };
        true
    }

    /// Rendered output text.
    pub fn text(&self) -> String {
        render(&self.state)
    }
}

/// Render a panel state to the text shown in its output area.
pub fn render(state: &PanelState) -> String {
    match state {
        PanelState::Idle => String::new(),
        PanelState::Loading => LOADING_TEXT.to_string(),
        PanelState::Success(data) => format_output(data),
        PanelState::Error(message) => format!("Error: {message}"),
    }
}

/// Format a response body: strings verbatim, falsy values as "No data",
/// everything else as indented JSON.
pub fn format_output(data: &Value) -> String {
    if is_falsy(data) {
        return NO_DATA_TEXT.to_string();
    }
    match data {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// JSON values treated as "nothing to show".
pub(crate) fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

// ---------------------------------------------------------------------------
// Submission plumbing
// ---------------------------------------------------------------------------

/// A request derived from a panel form.
#[derive(Debug, Clone)]
pub struct PanelRequest {
    pub path: String,
    pub options: RequestOptions,
}

impl PanelRequest {
    pub fn get(path: String) -> Self {
        Self {
            path,
            options: RequestOptions::default(),
        }
    }
}

/// Run a prepared request against `view`: loading, fetch, then outcome.
pub(crate) fn run<T: Transport>(
    view: &mut PanelView,
    client: &ApiClient<T>,
    request: Result<PanelRequest, SubmitError>,
) {
    let ticket = view.begin();
    let result = request.and_then(|req| {
        client
            .fetch_json(&req.path, req.options)
            .map_err(SubmitError::from)
    });
    view.complete(ticket, result.map_err(|e| e.to_string()));
}

/// Percent-encode a single path segment or query value.
pub(crate) fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn render_covers_every_state() {
        assert_eq!(render(&PanelState::Idle), "");
        assert_eq!(render(&PanelState::Loading), "Loading...");
        assert_eq!(render(&PanelState::Error("boom".into())), "Error: boom");
        assert_eq!(render(&PanelState::Success(json!("plain"))), "plain");
    }

    #[test]
    fn objects_are_pretty_printed_in_server_order() {
        let data: Value = serde_json::from_str(r#"{"z":1,"a":[true]}"#).unwrap();
        assert_eq!(
            format_output(&data),
            "{\n  \"z\": 1,\n  \"a\": [\n    true\n  ]\n}"
        );
    }

    #[test]
    fn falsy_values_show_no_data() {
        for value in [json!(null), json!(false), json!(0), json!("")] {
            assert_eq!(format_output(&value), "No data");
        }
        assert_eq!(format_output(&json!([])), "[]");
        assert_eq!(format_output(&json!(3)), "3");
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut view = PanelView::default();
        let first = view.begin();
        let second = view.begin();

        assert!(view.complete(second, Ok(json!("new"))));
        assert!(!view.complete(first, Ok(json!("old"))));
        assert_eq!(view.text(), "new");
    }

    #[test]
    fn stale_error_does_not_replace_loading() {
        let mut view = PanelView::default();
        let first = view.begin();
        let _second = view.begin();
        assert!(!view.complete(first, Err("late".into())));
        assert_eq!(view.state(), &PanelState::Loading);
    }

    #[test]
    fn encode_escapes_reserved_characters() {
        assert_eq!(encode("host 1&x"), "host%201%26x");
        assert_eq!(encode("wait-stats"), "wait-stats");
    }
}
