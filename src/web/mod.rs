//! Embedded web dashboard for sqlpulse.
//!
//! A lightweight HTTP server (sync, via `tiny_http`) that renders the
//! dashboard document as HTML and turns browser actions into dashboard
//! events:
//!
//! - `GET /` renders the page
//! - `GET /tabs/{target}` selects a tab
//! - `POST /forms/{form-id}` submits a form
//! - `POST /click/{button-id}` clicks a button (configuration refresh)
//! - `GET /health` reports liveness
//!
//! Launched via `sqlpulse web` (default: `http://127.0.0.1:9750`).

mod form;
mod frontend;

use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tracing::{info, warn};

use crate::dashboard::{Dashboard, Event};
use crate::http::Transport;

pub use form::{apply_submission, parse_urlencoded};
pub use frontend::render_page;

type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Serve the dashboard on `addr`.
///
/// Blocks the current thread. Requests are handled one at a time against
/// the single dashboard instance; per-request failures become 500 responses
/// without stopping the server. The configuration panel is loaded once on
/// start, like a fresh page load.
pub fn serve<T: Transport>(addr: &str, mut dashboard: Dashboard<T>, open: bool) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    dashboard.dispatch(Event::PageLoad);

    let url = format!("http://{addr}");
    println!("sqlpulse dashboard running at {url}");
    println!("Press Ctrl+C to stop.\n");
    info!(%addr, api = %dashboard.client().base_url(), "dashboard server started");

    if open && let Err(e) = open_browser(&url) {
        warn!(error = %e, "could not open browser");
    }

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let response = handle(&mut dashboard, &method, &url, request.as_reader());
        let status = response.status_code().0;
        let _ = request.respond(response);

        info!(
            %method,
            %url,
            status,
            at = %chrono::Local::now().format("%H:%M:%S"),
            "handled request"
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Read the body from `reader` and route the request.
///
/// A body that cannot be read (I/O failure or invalid UTF-8) is answered
/// with 400 and never reaches the dashboard, so a truncated form post
/// cannot be mistaken for a form with every checkbox cleared.
pub fn handle<T: Transport, R: Read>(
    dashboard: &mut Dashboard<T>,
    method: &Method,
    url: &str,
    reader: R,
) -> HttpResponse {
    let body = match read_body(method, reader) {
        Ok(body) => body,
        Err(e) => {
            warn!(%method, %url, error = %e, "failed to read request body");
            return json_response(r#"{"error": "unreadable request body"}"#, 400);
        }
    };

    match route(dashboard, method, url, body.as_deref()) {
        Ok(resp) => resp,
        Err(e) => {
            warn!(%method, %url, error = %e, "request handling failed");
            let body = serde_json::json!({ "error": e.to_string() }).to_string();
            json_response(&body, 500)
        }
    }
}

fn read_body<R: Read>(method: &Method, mut reader: R) -> std::io::Result<Option<String>> {
    if !matches!(method, Method::Post | Method::Put) {
        return Ok(None);
    }
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    Ok(Some(buf))
}

/// Route a request to the dashboard.
pub fn route<T: Transport>(
    dashboard: &mut Dashboard<T>,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Result<HttpResponse> {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (&Method::Get, "/") | (&Method::Get, "/index.html") => {
            Ok(html_response(render_page(dashboard)))
        }
        (&Method::Get, "/health") => Ok(json_response(r#"{"status":"ok"}"#, 200)),
        (&Method::Get, p) if p.starts_with("/tabs/") => {
            let target = path_param(p, "/tabs/")?;
            dashboard.dispatch(Event::TabClick(target));
            Ok(redirect_home())
        }
        (&Method::Post, p) if p.starts_with("/forms/") => {
            let form_id = path_param(p, "/forms/")?;
            let pairs = parse_urlencoded(body.unwrap_or(""));
            let Some(form) = dashboard.form_mut(&form_id) else {
                return Ok(not_found());
            };
            apply_submission(form, &pairs);
            dashboard.dispatch(Event::Submit(form_id));
            Ok(redirect_home())
        }
        (&Method::Post, p) if p.starts_with("/click/") => {
            let button = path_param(p, "/click/")?;
            dashboard.dispatch(Event::Click(button));
            Ok(redirect_home())
        }
        _ => Ok(not_found()),
    }
}

fn path_param(path: &str, prefix: &str) -> Result<String> {
    let raw = path.strip_prefix(prefix).unwrap_or_default();
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .with_context(|| format!("invalid path segment in {path}"))
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn html_response(html: String) -> HttpResponse {
    Response::from_data(html.into_bytes())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

fn json_response(body: &str, status: u16) -> HttpResponse {
    Response::from_data(body.as_bytes().to_vec())
        .with_header(content_type_json())
        .with_status_code(StatusCode(status))
}

/// 303 back to the page so a reload does not resubmit the form.
fn redirect_home() -> HttpResponse {
    let location = Header::from_bytes("Location", "/").expect("static header is valid");
    Response::from_data(Vec::new())
        .with_header(location)
        .with_status_code(StatusCode(303))
}

fn not_found() -> HttpResponse {
    json_response(r#"{"error": "not found"}"#, 404)
}

fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8")
        .expect("static header is valid")
}

fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").expect("static header is valid")
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_param_decodes() {
        assert_eq!(path_param("/tabs/live", "/tabs/").unwrap(), "live");
        assert_eq!(path_param("/forms/a%20b", "/forms/").unwrap(), "a b");
    }

    #[test]
    fn read_body_only_for_posts_and_puts() {
        assert_eq!(read_body(&Method::Get, "ignored".as_bytes()).unwrap(), None);
        assert_eq!(
            read_body(&Method::Post, "a=1".as_bytes()).unwrap().as_deref(),
            Some("a=1")
        );
        assert!(read_body(&Method::Post, &[0xff, 0xfe][..]).is_err());
    }
}
