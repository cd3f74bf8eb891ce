use std::net::SocketAddr;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use shared::{
    error::ApiError,
    protocol::{HealthResponse, SimilarArtworksResponse, HEALTH_PATH, IMAGE_FIELD, SIMILAR_PATH},
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};

mod catalog;
mod config;

use config::load_settings;

const MAX_IMAGE_BYTES: usize = 16 * 1024 * 1024;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let app = build_router();

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "demo recommendation service listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router() -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health))
        .route(SIMILAR_PATH, post(find_similar))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_IMAGE_BYTES))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Art recommendation demo service is running".to_string(),
    })
}

/// Accepts the upload and answers with the fixed demo catalogue; the image
/// itself is never inspected.
async fn find_similar(mut multipart: Multipart) -> ApiResult<SimilarArtworksResponse> {
    let mut image_size = None;
    while let Some(field) = multipart.next_field().await.map_err(reject_multipart)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let bytes = field.bytes().await.map_err(reject_multipart)?;
        image_size = Some(bytes.len());
    }

    match image_size {
        None => Err(reject(ApiError::validation(format!(
            "missing '{IMAGE_FIELD}' part"
        )))),
        Some(0) => Err(reject(ApiError::validation("image part cannot be empty"))),
        Some(size_bytes) => {
            info!(size_bytes, "serving demo recommendations");
            Ok(Json(SimilarArtworksResponse {
                similar_artworks: catalog::demo_recommendations(),
            }))
        }
    }
}

fn reject(error: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match error.code {
        shared::error::ErrorCode::Validation => StatusCode::BAD_REQUEST,
        shared::error::ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
    };
    (status, Json(error))
}

fn reject_multipart(err: MultipartError) -> (StatusCode, Json<ApiError>) {
    warn!(%err, "rejecting malformed upload");
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        reject(ApiError::payload_too_large(MAX_IMAGE_BYTES))
    } else {
        reject(ApiError::validation(err.body_text()))
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
