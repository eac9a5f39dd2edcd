//! Shared test support: an in-memory transport that records every request
//! and replays canned responses in order.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use sqlpulse::dashboard::Dashboard;
use sqlpulse::http::{ApiClient, ApiRequest, RawResponse, RequestError, Transport};
use sqlpulse::settings::schema::PanelSettings;

#[derive(Default)]
pub struct FakeTransport {
    responses: RefCell<VecDeque<Result<RawResponse, RequestError>>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl FakeTransport {
    /// Queue a response with the given status and body.
    pub fn respond(&self, status: u16, body: &str) {
        self.responses.borrow_mut().push_back(Ok(RawResponse {
            status,
            body: body.to_string(),
        }));
    }

    /// Queue a network failure.
    pub fn fail(&self, message: &str) {
        self.responses
            .borrow_mut()
            .push_back(Err(RequestError::Network(message.to_string())));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub fn last_request(&self) -> ApiRequest {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: &ApiRequest) -> Result<RawResponse, RequestError> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(RequestError::Network("no canned response".to_string())))
    }
}

pub const BASE_URL: &str = "http://api.test";

pub fn dashboard() -> Dashboard<FakeTransport> {
    Dashboard::new(
        ApiClient::new(BASE_URL, FakeTransport::default()),
        &PanelSettings::default(),
    )
}

pub fn fake(dashboard: &Dashboard<FakeTransport>) -> &FakeTransport {
    dashboard.client().transport()
}
