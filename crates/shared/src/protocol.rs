use serde::{Deserialize, Serialize};

use crate::domain::MatchRecord;

/// Multipart field carrying the uploaded image bytes.
pub const IMAGE_FIELD: &str = "image";
pub const SIMILAR_PATH: &str = "/api/similar";
pub const HEALTH_PATH: &str = "/health";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarArtworksResponse {
    pub similar_artworks: Vec<MatchRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}
