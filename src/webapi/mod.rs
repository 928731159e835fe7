//! Fake DownloadStation WebAPI
//!
//! Entry point for HTTP request processing: method validation, endpoint
//! lookup, dispatch to the `auth.cgi` / `task.cgi` handlers and access
//! logging.

mod auth;
mod error;
pub mod store;
mod task;
pub mod types;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::http::{self, Query};
use crate::logger::{self, AccessLogEntry};

pub use error::ApiError;

/// The two CGI endpoints the fake NAS exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Auth,
    Task,
}

impl Endpoint {
    /// Clients that join a base URL ending in `/` send `//webapi/...`,
    /// so a doubled leading slash is accepted as well.
    pub fn resolve(path: &str) -> Option<Self> {
        match path {
            "/webapi/auth.cgi" | "//webapi/auth.cgi" => Some(Self::Auth),
            "/webapi/DownloadStation/task.cgi" | "//webapi/DownloadStation/task.cgi" => {
                Some(Self::Task)
            }
            _ => None,
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let raw_query = req.uri().query().map(ToString::to_string);
    let query = Query::parse(raw_query.as_deref());

    let response = dispatch(&method, &path, &query, &state).await;

    if state.cached_access_log.load(Ordering::Relaxed) {
        let mut entry = AccessLogEntry::new(peer_addr.ip().to_string(), method.to_string(), path);
        entry.query = raw_query;
        entry.api_method = query.get("method").map(ToString::to_string);
        entry.http_version = format!("{:?}", req.version())
            .trim_start_matches("HTTP/")
            .to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = hyper::body::Body::size_hint(response.body())
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.user_agent = req
            .headers()
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route a parsed request to its handler
pub async fn dispatch(
    method: &Method,
    path: &str,
    query: &Query,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let Some(endpoint) = Endpoint::resolve(path) else {
        return http::build_404_response();
    };

    if *method != Method::GET {
        logger::log_warning(&format!("Method not allowed: {method} {path}"));
        return http::build_405_response();
    }

    let result = match endpoint {
        Endpoint::Auth => auth::handle_auth(query, state),
        Endpoint::Task => task::handle_task(query, state).await,
    };

    result.unwrap_or_else(|err| error_response(&err))
}

/// Missing arguments are an HTTP-level 400; everything else is the
/// `{"success": false, "error": {"code": N}}` envelope
fn error_response(err: &ApiError) -> Response<Full<Bytes>> {
    logger::log_warning(&format!("Request rejected: {err}"));
    match err.code() {
        Some(code) => http::build_json_response(&types::ApiResponse::failure(code)),
        None => http::build_400_response(&err.to_string()),
    }
}
