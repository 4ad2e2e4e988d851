//! OpenAPI document, Swagger UI and ReDoc routes.

use axum::{
    body::Body,
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
};
use rust_embed::Embed;

/// Embedded Swagger UI assets.
#[derive(Embed)]
#[folder = "assets/swagger-ui/"]
struct SwaggerAssets;

const OPENAPI_SPEC: &str = include_str!("../../../../docs/api/openapi.yaml");

const REDOC_PAGE: &str = include_str!("../../assets/redoc/index.html");

const DOCS_PREFIX: &str = "/docs/";

/// Maps a request path under `/docs/` to an embedded asset name.
fn asset_path(path: &str) -> &str {
    let path = path.trim_start_matches(DOCS_PREFIX);
    if path.is_empty() {
        "index.html"
    } else {
        path
    }
}

/// GET /docs
pub async fn swagger_ui_redirect() -> Redirect {
    Redirect::permanent(DOCS_PREFIX)
}

/// GET /docs/ and /docs/*path
pub async fn swagger_ui(uri: Uri) -> Response {
    let path = asset_path(uri.path());

    match SwaggerAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, mime.as_ref())
                .header(header::CACHE_CONTROL, "public, max-age=3600")
                .body(Body::from(content.data.into_owned()))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// GET /docs/openapi.yaml
pub async fn openapi_spec() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/yaml; charset=utf-8")],
        OPENAPI_SPEC,
    )
}

/// GET /redoc
pub async fn redoc() -> Html<&'static str> {
    Html(REDOC_PAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_structure() {
        assert!(OPENAPI_SPEC.contains("openapi: 3.1"));
        assert!(OPENAPI_SPEC.contains("info:"));
        assert!(OPENAPI_SPEC.contains("paths:"));
        assert!(OPENAPI_SPEC.contains("components:"));
    }

    #[test]
    fn test_openapi_spec_documents_resources() {
        for endpoint in [
            "/api/v1/users",
            "/api/v1/events",
            "/api/v1/events/{event_id}/registrations",
            "/api/v1/events/{event_id}/hosts",
            "/api/v1/events/{event_id}/vehicle-shares",
            "/api/v1/users/{user_id}/preferences/{date}",
        ] {
            assert!(
                OPENAPI_SPEC.contains(endpoint),
                "OpenAPI document should describe {}",
                endpoint
            );
        }
    }

    #[test]
    fn test_swagger_index_exists() {
        assert!(SwaggerAssets::get("index.html").is_some());
    }

    #[test]
    fn test_redoc_page_points_at_document() {
        assert!(REDOC_PAGE.contains("/docs/openapi.yaml"));
    }

    #[test]
    fn test_asset_path() {
        assert_eq!(asset_path("/docs/"), "index.html");
        assert_eq!(asset_path("/docs/index.html"), "index.html");
        assert_eq!(asset_path("/docs/swagger.css"), "swagger.css");
    }

    #[test]
    fn test_mime_types() {
        let html = mime_guess::from_path("index.html").first_or_octet_stream();
        assert_eq!(html.subtype(), "html");
        let unknown = mime_guess::from_path("file.unknownext").first_or_octet_stream();
        assert_eq!(unknown.subtype(), "octet-stream");
    }
}
