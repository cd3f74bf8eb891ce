use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::{
    domain::MatchRecord,
    protocol::{HealthResponse, SimilarArtworksResponse, IMAGE_FIELD},
};
use tracing::{debug, info, warn};
use url::Url;

pub mod config;
pub mod error;

pub use config::{load_settings, ClientSettings};
pub use error::{SubmissionFailed, SUBMISSION_FAILED_MESSAGE};

/// Raw bytes of the image selected by the user, ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait RecommendationService: Send + Sync {
    /// Uploads one image and returns the matches in the order the service ranked them.
    async fn find_similar(&self, image: ImagePayload)
        -> Result<Vec<MatchRecord>, SubmissionFailed>;
    async fn fetch_artwork_image(&self, url: &str) -> Result<Vec<u8>>;
    async fn check_health(&self) -> Result<HealthResponse>;
}

pub struct HttpRecommendationClient {
    http: Client,
    endpoint: Url,
    health_url: Url,
}

impl HttpRecommendationClient {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            endpoint: settings.endpoint_url()?,
            health_url: settings.health_url()?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post_image(&self, image: ImagePayload) -> Result<SimilarArtworksResponse> {
        let size_bytes = image.bytes.len();
        let mut part = Part::bytes(image.bytes).file_name(image.file_name);
        if let Some(mime_type) = image.mime_type.as_deref() {
            part = part
                .mime_str(mime_type)
                .with_context(|| format!("invalid MIME type '{mime_type}'"))?;
        }
        let form = Form::new().part(IMAGE_FIELD, part);

        debug!(endpoint = %self.endpoint, size_bytes, "posting image to similarity endpoint");
        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json::<SimilarArtworksResponse>()
            .await
            .context("malformed similar artworks payload")?;
        Ok(response)
    }
}

#[async_trait]
impl RecommendationService for HttpRecommendationClient {
    async fn find_similar(
        &self,
        image: ImagePayload,
    ) -> Result<Vec<MatchRecord>, SubmissionFailed> {
        match self.post_image(image).await {
            Ok(response) => {
                info!(
                    matches = response.similar_artworks.len(),
                    "similarity request succeeded"
                );
                Ok(response.similar_artworks)
            }
            Err(err) => {
                warn!(error = format!("{err:#}"), "similarity request failed");
                Err(SubmissionFailed::new(format!("{err:#}")))
            }
        }
    }

    async fn fetch_artwork_image(&self, url: &str) -> Result<Vec<u8>> {
        let bytes = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }

    async fn check_health(&self) -> Result<HealthResponse> {
        let health = self
            .http
            .get(self.health_url.clone())
            .send()
            .await?
            .error_for_status()?
            .json::<HealthResponse>()
            .await
            .context("malformed health payload")?;
        Ok(health)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
