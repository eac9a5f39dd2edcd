/// Live panel: DMV snapshots via `GET /live/{endpoint}`.
use super::{PanelRequest, PanelView, SubmitError, encode, run};
use crate::dom::Form;
use crate::dom::layout::{LIVE_ENDPOINT, LIVE_LIMIT};
use crate::http::{ApiClient, Transport};

pub fn build_request(form: &Form) -> Result<PanelRequest, SubmitError> {
    let endpoint = form.value_of(LIVE_ENDPOINT);
    let limit = form.value_of(LIVE_LIMIT);
    Ok(PanelRequest::get(format!(
        "/live/{}?limit={}",
        encode(endpoint),
        encode(limit)
    )))
}

/// Handle a live form submission.
pub fn submit<T: Transport>(form: &Form, view: &mut PanelView, client: &ApiClient<T>) {
    run(view, client, build_request(form));
}
