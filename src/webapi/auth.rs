// auth.cgi handler
// Every login succeeds and hands out the same session id

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use super::error::ApiError;
use super::types::{ApiResponse, Empty, LoginData};
use crate::config::AppState;
use crate::http::{build_json_response, Query};

pub fn handle_auth(query: &Query, state: &AppState) -> Result<Response<Full<Bytes>>, ApiError> {
    let method = query.get("method").ok_or(ApiError::MissingArgument("method"))?;

    Ok(match method {
        "login" => build_json_response(&ApiResponse::ok(LoginData {
            sid: state.config.fixture.sid,
        })),
        // logout and anything unknown
        _ => build_json_response(&ApiResponse::ok(Empty {})),
    })
}
