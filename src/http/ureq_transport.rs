/// Blocking [`Transport`] backed by `ureq`.
///
/// Error statuses are not treated as failures here: `ureq` reports them as
/// `Error::Status`, which is converted back into a [`RawResponse`] so the
/// client can apply its own status handling.
use std::time::Duration;

use super::{ApiRequest, RawResponse, RequestError, Transport};

#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    timeout: Duration,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &ApiRequest) -> Result<RawResponse, RequestError> {
        // "localhost" may resolve to ::1 first while the API binds IPv4 only.
        let url = request.url.replace("://localhost", "://127.0.0.1");

        let mut req = self.agent.request(request.method.as_str(), &url);
        for (name, value) in &request.headers {
            req = req.set(name, value);
        }

        let result = match &request.body {
            Some(body) => req.send_string(body),
            None => req.call(),
        };

        match result {
            Ok(resp) => read_response(resp),
            Err(ureq::Error::Status(_, resp)) => read_response(resp),
            Err(ureq::Error::Transport(t)) => Err(RequestError::Network(t.to_string())),
        }
    }
}

fn read_response(resp: ureq::Response) -> Result<RawResponse, RequestError> {
    let status = resp.status();
    let body = resp
        .into_string()
        .map_err(|e| RequestError::Network(format!("failed to read response body: {e}")))?;
    Ok(RawResponse { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;

    #[test]
    fn keeps_configured_timeout() {
        let transport = UreqTransport::new(Duration::from_millis(1500));
        assert_eq!(transport.timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn unreachable_host_is_network_error() {
        let transport = UreqTransport::new(Duration::from_millis(500));
        let request = ApiRequest {
            method: Method::Get,
            // Port 9 (discard) is almost never listening locally.
            url: "http://127.0.0.1:9/config".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let err = transport.send(&request).unwrap_err();
        assert!(matches!(err, RequestError::Network(_)));
    }
}
