//! Wire models, errors, and the backend trait.

use pairing::doc::{Bounds, RemoteId, RemoteIds};
use pairing::project::CropRect;
use pairing::sync::Submission;
use serde::{Deserialize, Serialize};

/// Backend project identifier.
pub type ProjectId = i64;

/// Message used when the backend gives no `detail`.
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong!";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by backend client operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status. `message` is the
    /// backend's `detail` or [`FALLBACK_ERROR_MESSAGE`].
    #[error("{message} (status {status})")]
    Status { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// A configuration value is invalid.
    #[error("config error: {0}")]
    Config(String),
}

impl ApiError {
    /// The text shown to the user: the backend's message for status errors,
    /// the full error otherwise.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

// =============================================================================
// WIRE MODELS
// =============================================================================

/// Body of "add marker pair". `col`/`row` are whole image pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMarkerPair {
    pub lat: f64,
    pub lng: f64,
    pub col: i64,
    pub row: i64,
    pub name: String,
}

impl From<&Submission> for NewMarkerPair {
    fn from(sub: &Submission) -> Self {
        Self {
            lat: sub.lat_long.lat,
            lng: sub.lat_long.lng,
            col: sub.pixel.col(),
            row: sub.pixel.row(),
            name: String::new(),
        }
    }
}

/// A project as returned by `GET /project/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub id: Option<ProjectId>,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub crs: Option<String>,
    pub created: Option<String>,
    pub last_modified: Option<String>,
}

/// A stored point as returned by `GET /project/{id}/point`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointInfo {
    pub lat: f64,
    pub lng: f64,
    pub col: i64,
    pub row: i64,
    pub error: Option<f64>,
    pub id: Option<RemoteId>,
    pub name: Option<String>,
    #[serde(rename = "projectId")]
    pub project_id: Option<ProjectId>,
    /// Point number within the project; the id used for deletion.
    #[serde(rename = "Idproj")]
    pub in_project_id: Option<RemoteId>,
}

// =============================================================================
// BACKEND TRAIT
// =============================================================================

/// The georeferencing backend. Enables mocking in tests.
///
/// Every method returns an [`ApiError`] when the request fails or the backend
/// answers with an error status.
#[async_trait::async_trait]
pub trait GeorefBackend: Send + Sync {
    async fn create_project(&self, name: &str) -> Result<ProjectId, ApiError>;

    async fn rename_project(&self, project: ProjectId, name: &str) -> Result<(), ApiError>;

    async fn get_project(&self, project: ProjectId) -> Result<ProjectInfo, ApiError>;

    async fn delete_project(&self, project: ProjectId) -> Result<(), ApiError>;

    /// Upload the project's working image as PNG.
    async fn upload_image(&self, project: ProjectId, png: Vec<u8>) -> Result<(), ApiError>;

    async fn add_marker_pair(&self, project: ProjectId, pair: &NewMarkerPair) -> Result<RemoteIds, ApiError>;

    async fn list_points(&self, project: ProjectId) -> Result<Vec<PointInfo>, ApiError>;

    /// Delete one pair by its in-project id.
    async fn delete_marker_pair(&self, project: ProjectId, point: RemoteId) -> Result<(), ApiError>;

    async fn delete_all_markers(&self, project: ProjectId) -> Result<(), ApiError>;

    /// Crop a PNG to `rect`; returns the cropped PNG.
    async fn crop_png(&self, png: Vec<u8>, rect: CropRect) -> Result<Vec<u8>, ApiError>;

    /// Run georeferencing; returns the raster bytes.
    async fn georeference(&self, project: ProjectId) -> Result<Vec<u8>, ApiError>;

    /// Corner coordinates of the georeferenced raster.
    async fn corner_coordinates(&self, project: ProjectId) -> Result<Bounds, ApiError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
