//! Transport-level layers shared by every route.
//!
//! - `x-request-id` generated when missing and echoed on the response
//! - access log via `TraceLayer`
//! - body limit sized for the largest multipart form; overflow answers 413
//! - 30s request timeout

use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::extract::DefaultBodyLimit;
use axum::http::{StatusCode, header::HeaderName};
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Room for the multipart envelope and the text fields sent next to the files.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn body_limit(config: &Config) -> usize {
    config.max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES)
}

pub fn apply(router: Router, config: &Config) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");
    let limit = body_limit(config);

    let layers = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|err: BoxError| async move {
            if err.is::<tower::timeout::error::Elapsed>() {
                StatusCode::REQUEST_TIMEOUT
            } else {
                tracing::error!(error = %err, "unhandled middleware error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }))
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(RequestBodyLimitLayer::new(limit))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http());

    // extractor-level limit (axum defaults to 2 MiB)
    router.layer(DefaultBodyLimit::max(limit)).layer(layers)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, header},
        routing::post,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::api::payload::Payload;
    use crate::services::upload::LARGEST_FORM_BYTES;
    use crate::state::testing::test_config;

    const MIB: usize = 1024 * 1024;
    const BOUNDARY: &str = "gallery-boundary";

    fn gallery_form(images: usize, image_bytes: usize) -> Vec<u8> {
        let mut body = Vec::new();
        for i in 0..images {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"galleryImages\"; \
                     filename=\"g{i}.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
                )
                .as_bytes(),
            );
            body.resize(body.len() + image_bytes, b'x');
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn app(config: &Config) -> Router {
        let router = Router::new().route("/upload", post(|_: Payload| async { StatusCode::NO_CONTENT }));
        apply(router, config)
    }

    fn multipart(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[test]
    fn default_limit_fits_a_full_gallery() {
        assert!(body_limit(&test_config()) > LARGEST_FORM_BYTES);
    }

    #[tokio::test]
    async fn several_large_gallery_images_fit() {
        let res = app(&test_config())
            .oneshot(multipart(gallery_form(2, 6 * MIB)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn oversized_form_is_413() {
        let mut config = test_config();
        config.max_upload_bytes = MIB;
        let res = app(&config)
            .oneshot(multipart(gallery_form(2, 2 * MIB)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
