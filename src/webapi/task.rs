// task.cgi handler
// list / create / delete / pause / resume against the shared task list

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use super::error::ApiError;
use super::types::{ApiResponse, Empty, TaskListData, STATUS_PAUSED, STATUS_WAITING};
use crate::config::AppState;
use crate::http::{build_json_response, Query};

pub async fn handle_task(
    query: &Query,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let method = query.get("method").ok_or(ApiError::MissingArgument("method"))?;

    match method {
        "list" => {
            let tasks = state.tasks.read().await;
            Ok(build_json_response(&ApiResponse::ok(TaskListData {
                tasks: tasks.list(),
            })))
        }
        "create" => {
            let uri = query.get("uri").ok_or(ApiError::MissingArgument("uri"))?;
            state.tasks.write().await.create(uri);
            Ok(empty_success())
        }
        "delete" => {
            let indices = parse_indices(query)?;
            state.tasks.write().await.delete(&indices)?;
            Ok(empty_success())
        }
        "pause" => {
            let indices = parse_indices(query)?;
            state.tasks.write().await.set_status(&indices, STATUS_PAUSED)?;
            Ok(empty_success())
        }
        "resume" => {
            let indices = parse_indices(query)?;
            state.tasks.write().await.set_status(&indices, STATUS_WAITING)?;
            Ok(empty_success())
        }
        _ => Ok(empty_success()),
    }
}

fn empty_success() -> Response<Full<Bytes>> {
    build_json_response(&ApiResponse::ok(Empty {}))
}

/// `id=0` or `id=0,2,3`
fn parse_indices(query: &Query) -> Result<Vec<usize>, ApiError> {
    let raw = query.get("id").ok_or(ApiError::MissingArgument("id"))?;
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| ApiError::InvalidParameter {
                    name: "id",
                    value: raw.to_string(),
                })
        })
        .collect()
}
