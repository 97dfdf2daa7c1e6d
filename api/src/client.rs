//! reqwest implementation of [`GeorefBackend`].
//!
//! Thin HTTP wrapper over the backend routes. Response decoding lives in the
//! pure `parse_*` functions at the bottom so it can be tested on fixtures.

use std::time::Duration;

use pairing::doc::{Bounds, RemoteId, RemoteIds};
use pairing::project::CropRect;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::types::{
    ApiError, FALLBACK_ERROR_MESSAGE, GeorefBackend, NewMarkerPair, PointInfo, ProjectId, ProjectInfo,
};

const IMAGE_FILE_NAME: &str = "image.png";
const IMAGE_MIME: &str = "image/png";

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone() })
    }

    /// XYZ tile URL template for the georeferenced raster, with literal
    /// `{z}`, `{x}` and `{y}` placeholders for a map client.
    #[must_use]
    pub fn tile_url_template(&self, project: ProjectId) -> String {
        format!("{}/project/{project}/tiles/{{z}}/{{x}}/{{y}}.png", self.base_url)
    }

    /// URL of one tile of the georeferenced raster.
    #[must_use]
    pub fn tile_url(&self, project: ProjectId, z: u32, x: u32, y: u32) -> String {
        format!("{}/project/{project}/tiles/{z}/{x}/{y}.png", self.base_url)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{path}", self.base_url))
    }

    /// Send and fail on non-success statuses, decoding the backend's error
    /// message from the body.
    async fn send(&self, op: &'static str, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            tracing::debug!(op, status = status.as_u16(), "backend request ok");
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = parse_error_message(&body);
        tracing::warn!(op, status = status.as_u16(), %message, "backend request failed");
        Err(ApiError::Status { status: status.as_u16(), message })
    }

    async fn send_text(&self, op: &'static str, request: RequestBuilder) -> Result<String, ApiError> {
        self.send(op, request)
            .await?
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))
    }

    async fn send_bytes(&self, op: &'static str, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let bytes = self
            .send(op, request)
            .await?
            .bytes()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

fn png_form(png: Vec<u8>) -> Result<Form, ApiError> {
    let part = Part::bytes(png)
        .file_name(IMAGE_FILE_NAME)
        .mime_str(IMAGE_MIME)
        .map_err(|e| ApiError::Request(e.to_string()))?;
    Ok(Form::new().part("file", part))
}

#[async_trait::async_trait]
impl GeorefBackend for ApiClient {
    async fn create_project(&self, name: &str) -> Result<ProjectId, ApiError> {
        let req = self.request(Method::POST, "/project/").json(&serde_json::json!({ "name": name }));
        let body = self.send_text("create_project", req).await?;
        parse_project_id(&body)
    }

    async fn rename_project(&self, project: ProjectId, name: &str) -> Result<(), ApiError> {
        let req = self
            .request(Method::PUT, &format!("/project/{project}"))
            .json(&serde_json::json!({ "name": name }));
        self.send("rename_project", req).await?;
        Ok(())
    }

    async fn get_project(&self, project: ProjectId) -> Result<ProjectInfo, ApiError> {
        let req = self.request(Method::GET, &format!("/project/{project}"));
        let body = self.send_text("get_project", req).await?;
        parse_json(&body)
    }

    async fn delete_project(&self, project: ProjectId) -> Result<(), ApiError> {
        let req = self
            .request(Method::DELETE, &format!("/project/{project}"))
            .header(reqwest::header::ACCEPT, "application/json");
        self.send("delete_project", req).await?;
        Ok(())
    }

    async fn upload_image(&self, project: ProjectId, png: Vec<u8>) -> Result<(), ApiError> {
        let req = self
            .request(Method::POST, &format!("/project/{project}/image"))
            .multipart(png_form(png)?);
        self.send("upload_image", req).await?;
        Ok(())
    }

    async fn add_marker_pair(&self, project: ProjectId, pair: &NewMarkerPair) -> Result<RemoteIds, ApiError> {
        let req = self.request(Method::POST, &format!("/project/{project}/point")).json(pair);
        let body = self.send_text("add_marker_pair", req).await?;
        parse_point_created(&body)
    }

    async fn list_points(&self, project: ProjectId) -> Result<Vec<PointInfo>, ApiError> {
        let req = self.request(Method::GET, &format!("/project/{project}/point"));
        let body = self.send_text("list_points", req).await?;
        parse_json(&body)
    }

    async fn delete_marker_pair(&self, project: ProjectId, point: RemoteId) -> Result<(), ApiError> {
        let req = self
            .request(Method::DELETE, &format!("/project/{project}/point/{point}"))
            .header(reqwest::header::ACCEPT, "application/json");
        self.send("delete_marker_pair", req).await?;
        Ok(())
    }

    async fn delete_all_markers(&self, project: ProjectId) -> Result<(), ApiError> {
        let req = self
            .request(Method::DELETE, &format!("/project/{project}/point"))
            .header(reqwest::header::ACCEPT, "application/json");
        self.send("delete_all_markers", req).await?;
        Ok(())
    }

    async fn crop_png(&self, png: Vec<u8>, rect: CropRect) -> Result<Vec<u8>, ApiError> {
        let req = self
            .request(Method::POST, "/converter/cropPng")
            .query(&[("p1x", rect.p1x), ("p1y", rect.p1y), ("p2x", rect.p2x), ("p2y", rect.p2y)])
            .multipart(png_form(png)?);
        self.send_bytes("crop_png", req).await
    }

    async fn georeference(&self, project: ProjectId) -> Result<Vec<u8>, ApiError> {
        let req = self.request(Method::GET, &format!("/project/{project}/georef/initial"));
        self.send_bytes("georeference", req).await
    }

    async fn corner_coordinates(&self, project: ProjectId) -> Result<Bounds, ApiError> {
        let req = self.request(Method::GET, &format!("/project/{project}/georef/coordinates"));
        let body = self.send_text("corner_coordinates", req).await?;
        parse_corners(&body)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
struct CreatedProject {
    id: ProjectId,
}

#[derive(Deserialize)]
struct CreatedPoint {
    #[serde(rename = "Point")]
    point: CreatedPointIds,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedPointIds {
    id: RemoteId,
    in_project_id: RemoteId,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

/// User-facing message from an error body: the `detail` string, the joined
/// `msg` fields of a validation error list, or the fallback message.
pub fn parse_error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return FALLBACK_ERROR_MESSAGE.to_string();
    };
    match value.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
        Some(Value::Array(items)) => {
            let msgs: Vec<&str> = items.iter().filter_map(|item| item.get("msg")?.as_str()).collect();
            if msgs.is_empty() { FALLBACK_ERROR_MESSAGE.to_string() } else { msgs.join("; ") }
        }
        _ => FALLBACK_ERROR_MESSAGE.to_string(),
    }
}

/// `{"id": n}` from "create project".
///
/// # Errors
///
/// Returns [`ApiError::Parse`] if the body has no integer `id`.
pub fn parse_project_id(body: &str) -> Result<ProjectId, ApiError> {
    parse_json::<CreatedProject>(body).map(|p| p.id)
}

/// `{"Project": {"id"}, "Point": {"id", "inProjectId"}}` from "add marker pair".
///
/// # Errors
///
/// Returns [`ApiError::Parse`] if the point ids are missing.
pub fn parse_point_created(body: &str) -> Result<RemoteIds, ApiError> {
    let created: CreatedPoint = parse_json(body)?;
    Ok(RemoteIds { id: created.point.id, in_project_id: created.point.in_project_id })
}

/// Corner coordinates as `[west, south, east, north]`. The backend may nest
/// the numbers in arrays; they are flattened in order.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] unless exactly four numbers are found.
pub fn parse_corners(body: &str) -> Result<Bounds, ApiError> {
    let value: Value = parse_json(body)?;
    let mut flat = Vec::with_capacity(4);
    flatten_numbers(&value, &mut flat);
    Bounds::from_flat(&flat).ok_or_else(|| ApiError::Parse(format!("expected 4 corner values, got {}", flat.len())))
}

fn flatten_numbers(value: &Value, out: &mut Vec<f64>) {
    match value {
        Value::Number(n) => out.extend(n.as_f64()),
        Value::Array(items) => items.iter().for_each(|item| flatten_numbers(item, out)),
        _ => {}
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
