//! Presentation provider abstraction used by the slide cache.

/// Google Slides REST client.
pub mod google;

use futures::future::BoxFuture;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Result alias for presentation provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Renderable content of a single slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlideContent {
    /// Page object ID inside the presentation.
    pub object_id: String,
    /// Stretched background picture, if the page has one.
    pub background_image_url: Option<String>,
    /// Images placed on the page, in document order.
    pub element_image_urls: Vec<String>,
}

/// Read-only access to an external presentation service.
pub trait PresentationProvider: Send + Sync {
    /// Ordered object IDs of every slide in the presentation.
    fn list_slide_ids(&self, presentation_id: String) -> BoxFuture<'static, ProviderResult<Vec<String>>>;
    /// Fetch the current content of one slide. Never cached.
    fn slide_content(
        &self,
        presentation_id: String,
        slide_id: String,
    ) -> BoxFuture<'static, ProviderResult<SlideContent>>;
}

/// Failures raised while talking to the presentation provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The service account key could not be parsed or used for signing.
    #[error("invalid service account credential: {message}")]
    Credential {
        /// Why the key was rejected.
        message: String,
    },
    /// The configured API base URL cannot carry path segments.
    #[error("invalid API base url `{url}`: {message}")]
    InvalidBaseUrl {
        /// Configured URL.
        url: String,
        /// Why it was rejected.
        message: String,
    },
    /// The HTTP request could not be sent.
    #[error("failed to send request to `{path}`")]
    RequestSend {
        /// Requested resource path.
        path: String,
        /// Transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The provider answered with a non-success status.
    #[error("unexpected response status {status} for `{path}`")]
    RequestStatus {
        /// Requested resource path.
        path: String,
        /// Status returned by the provider.
        status: reqwest::StatusCode,
    },
    /// The response body did not match the expected shape.
    #[error("failed to decode response for `{path}`")]
    DecodeResponse {
        /// Requested resource path.
        path: String,
        /// Decoding error.
        #[source]
        source: reqwest::Error,
    },
    /// The presentation exists but exposes no pages.
    #[error("no pages found in presentation `{presentation_id}`")]
    NoSlides {
        /// Presentation that came back empty.
        presentation_id: String,
    },
}
