#![allow(clippy::float_cmp)]

use super::*;

fn client() -> ApiClient {
    ApiClient::new(&ApiConfig::new("http://localhost:8000/").unwrap()).unwrap()
}

// =============================================================================
// URLs
// =============================================================================

#[test]
fn tile_urls() {
    let c = client();
    assert_eq!(c.tile_url(7, 12, 2100, 1200), "http://localhost:8000/project/7/tiles/12/2100/1200.png");
    assert_eq!(c.tile_url_template(7), "http://localhost:8000/project/7/tiles/{z}/{x}/{y}.png");
}

// =============================================================================
// Error bodies
// =============================================================================

#[test]
fn error_detail_string() {
    assert_eq!(parse_error_message(r#"{"detail": "Project not found"}"#), "Project not found");
}

#[test]
fn error_detail_validation_list() {
    let body = r#"{"detail": [
        {"loc": ["body", "lat"], "msg": "field required", "type": "value_error.missing"},
        {"loc": ["body", "col"], "msg": "value is not a valid integer", "type": "type_error.integer"}
    ]}"#;
    assert_eq!(parse_error_message(body), "field required; value is not a valid integer");
}

#[test]
fn error_without_detail_uses_fallback() {
    assert_eq!(parse_error_message(r#"{"error": "x"}"#), FALLBACK_ERROR_MESSAGE);
    assert_eq!(parse_error_message(r#"{"detail": ""}"#), FALLBACK_ERROR_MESSAGE);
    assert_eq!(parse_error_message("Internal Server Error"), FALLBACK_ERROR_MESSAGE);
    assert_eq!(parse_error_message(""), FALLBACK_ERROR_MESSAGE);
}

// =============================================================================
// Success bodies
// =============================================================================

#[test]
fn project_id() {
    assert_eq!(parse_project_id(r#"{"id": 42}"#).unwrap(), 42);
    assert!(matches!(parse_project_id(r#"{"name": "x"}"#), Err(ApiError::Parse(_))));
}

#[test]
fn point_created_ids() {
    let body = r#"{"Project": {"id": 42}, "Point": {"id": 913, "inProjectId": 3}}"#;
    assert_eq!(parse_point_created(body).unwrap(), RemoteIds { id: 913, in_project_id: 3 });
}

#[test]
fn point_created_missing_in_project_id_is_parse_error() {
    let body = r#"{"Project": {"id": 42}, "Point": {"id": 913}}"#;
    assert!(matches!(parse_point_created(body), Err(ApiError::Parse(_))));
}

#[test]
fn corners_flat() {
    let b = parse_corners("[10.1, 59.2, 11.3, 60.4]").unwrap();
    assert_eq!(b, Bounds { west: 10.1, south: 59.2, east: 11.3, north: 60.4 });
}

#[test]
fn corners_nested() {
    let b = parse_corners("[[10.1, 59.2], [11.3, [60.4]]]").unwrap();
    assert_eq!(b, Bounds { west: 10.1, south: 59.2, east: 11.3, north: 60.4 });
}

#[test]
fn corners_integers_accepted() {
    let b = parse_corners("[10, 59, 11, 60]").unwrap();
    assert_eq!(b.north, 60.0);
}

#[test]
fn corners_wrong_count_is_parse_error() {
    let err = parse_corners("[1.0, 2.0, 3.0]").unwrap_err();
    assert!(err.to_string().contains("got 3"));
    assert!(parse_corners(r#"{"west": 1}"#).is_err());
}

#[test]
fn point_list() {
    let body = r#"[
        {"lat": 1.0, "lng": 2.0, "col": 3, "row": 4, "id": 10, "Idproj": 1},
        {"lat": 5.0, "lng": 6.0, "col": 7, "row": 8, "id": 11, "Idproj": 2}
    ]"#;
    let points: Vec<PointInfo> = parse_json(body).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[1].in_project_id, Some(2));
    assert_eq!(points[0].error, None);
}
