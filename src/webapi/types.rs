// WebAPI payload types
// Task records and the `{"success": ..., "data": ...}` envelope

use serde::{Deserialize, Serialize};

pub const STATUS_WAITING: &str = "waiting";
pub const STATUS_DOWNLOADING: &str = "downloading";
pub const STATUS_PAUSED: &str = "paused";

/// A mock download job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub status: String,
    pub size: u64,
    pub additional: Additional,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Additional {
    #[serde(default)]
    pub transfer: TransferInfo,
}

/// Transfer progress, all values in bytes or bytes per second
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferInfo {
    #[serde(default)]
    pub size_downloaded: u64,
    #[serde(default)]
    pub size_uploaded: u64,
    #[serde(default)]
    pub speed_download: u64,
    #[serde(default)]
    pub speed_upload: u64,
}

/// Response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: u16,
}

impl<T: Serialize> ApiResponse<T> {
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<Empty> {
    pub const fn failure(code: u16) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody { code }),
        }
    }
}

/// Serializes as `{}`
#[derive(Debug, Serialize)]
pub struct Empty {}

#[derive(Debug, Serialize)]
pub struct LoginData {
    pub sid: u64,
}

#[derive(Debug, Serialize)]
pub struct TaskListData<'a> {
    pub tasks: &'a [Task],
}
