/// Metrics panel: telemetry lookups via `GET /metrics/{endpoint}`.
use super::{PanelRequest, PanelView, SubmitError, encode, run};
use crate::dom::Form;
use crate::dom::layout::{METRICS_ENDPOINT, METRICS_INSTANCE, METRICS_LIMIT, METRICS_SEARCH};
use crate::http::{ApiClient, Transport};

/// Build the request for the current form values.
///
/// `limit` is always sent as typed; `instance` and `q` only when non-empty
/// after trimming.
pub fn build_request(form: &Form) -> Result<PanelRequest, SubmitError> {
    let endpoint = form.value_of(METRICS_ENDPOINT);
    let instance = form.value_of(METRICS_INSTANCE).trim();
    let limit = form.value_of(METRICS_LIMIT);
    let search = form.value_of(METRICS_SEARCH).trim();

    let mut query = format!("limit={}", encode(limit));
    if !instance.is_empty() {
        query.push_str(&format!("&instance={}", encode(instance)));
    }
    if !search.is_empty() {
        query.push_str(&format!("&q={}", encode(search)));
    }

    Ok(PanelRequest::get(format!(
        "/metrics/{}?{query}",
        encode(endpoint)
    )))
}

/// Handle a metrics form submission.
pub fn submit<T: Transport>(form: &Form, view: &mut PanelView, client: &ApiClient<T>) {
    run(view, client, build_request(form));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Field;
    use crate::dom::layout::METRICS_FORM;

    fn form(endpoint: &str, instance: &str, limit: &str) -> Form {
        Form::new(
            METRICS_FORM,
            vec![
                Field::text(METRICS_ENDPOINT, "endpoint").with_value(endpoint),
                Field::text(METRICS_INSTANCE, "instance").with_value(instance),
                Field::text(METRICS_LIMIT, "limit").with_value(limit),
                Field::text(METRICS_SEARCH, "q"),
            ],
        )
    }

    #[test]
    fn omits_empty_instance() {
        let req = build_request(&form("cpu", "", "10")).unwrap();
        assert_eq!(req.path, "/metrics/cpu?limit=10");
    }

    #[test]
    fn whitespace_instance_counts_as_empty() {
        let req = build_request(&form("cpu", "   ", "10")).unwrap();
        assert_eq!(req.path, "/metrics/cpu?limit=10");
    }

    #[test]
    fn includes_trimmed_instance() {
        let req = build_request(&form("cpu", " host1 ", "10")).unwrap();
        assert_eq!(req.path, "/metrics/cpu?limit=10&instance=host1");
    }

    #[test]
    fn appends_log_search() {
        let mut f = form("logs", "", "100");
        f.set_value(METRICS_SEARCH, "deadlock victim");
        let req = build_request(&f).unwrap();
        assert_eq!(req.path, "/metrics/logs?limit=100&q=deadlock%20victim");
    }
}
