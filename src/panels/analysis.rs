/// Analysis panel: LLM insights via `POST /analysis/insights`.
use serde_json::{Map, Value};

use super::{PanelRequest, PanelView, SubmitError, run};
use crate::dom::Form;
use crate::dom::layout::{ANALYSIS_ISSUES, ANALYSIS_METRICS, ANALYSIS_TITLE};
use crate::http::{ApiClient, Method, RequestOptions, Transport};

pub const INSIGHTS_PATH: &str = "/analysis/insights";

/// Request body for the insights endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightsRequest {
    pub title: String,
    pub metrics: Value,
    pub issues: Option<String>,
}

impl InsightsRequest {
    /// Read the analysis form. Empty metrics text means an empty list.
    pub fn from_form(form: &Form) -> Result<Self, SubmitError> {
        let title = form.value_of(ANALYSIS_TITLE).trim();
        let metrics_raw = form.value_of(ANALYSIS_METRICS).trim();
        let issues = form.value_of(ANALYSIS_ISSUES).trim();

        let metrics = if metrics_raw.is_empty() {
            Value::Array(Vec::new())
        } else {
            serde_json::from_str(metrics_raw)
                .map_err(|e| SubmitError::InvalidJson(e.to_string()))?
        };

        Ok(Self {
            title: title.to_string(),
            metrics,
            issues: (!issues.is_empty()).then(|| issues.to_string()),
        })
    }

    /// Wire body. `issues` is left out entirely when unset.
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("title".to_string(), Value::String(self.title.clone()));
        body.insert("metrics".to_string(), self.metrics.clone());
        if let Some(issues) = &self.issues {
            body.insert("issues".to_string(), Value::String(issues.clone()));
        }
        Value::Object(body)
    }
}

pub fn build_request(form: &Form) -> Result<PanelRequest, SubmitError> {
    let payload = InsightsRequest::from_form(form)?;
    Ok(PanelRequest {
        path: INSIGHTS_PATH.to_string(),
        options: RequestOptions::with_json(Method::Post, &payload.to_body()),
    })
}

/// Handle an analysis form submission.
pub fn submit<T: Transport>(form: &Form, view: &mut PanelView, client: &ApiClient<T>) {
    run(view, client, build_request(form));
}
