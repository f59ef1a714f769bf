use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::slides::{PresentationProvider, ProviderError, ProviderResult, SlideContent};

use super::{
    auth::{ServiceAccountKey, TokenSource},
    models::{PageDocument, PresentationDocument},
};

/// Default Slides REST endpoint.
pub const DEFAULT_SLIDES_API_BASE_URL: &str = "https://slides.googleapis.com/v1";

/// Runtime configuration for the Google Slides client.
#[derive(Debug, Clone)]
pub struct GoogleSlidesConfig {
    /// Slides REST endpoint, without the resource path.
    pub api_base_url: String,
    /// Credential used to mint access tokens.
    pub key: ServiceAccountKey,
}

impl GoogleSlidesConfig {
    /// Configuration targeting the public Slides API.
    pub fn new(key: ServiceAccountKey) -> Self {
        Self {
            api_base_url: DEFAULT_SLIDES_API_BASE_URL.into(),
            key,
        }
    }

    /// Point the client at another endpoint.
    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }
}

fn parse_base_url(raw: &str) -> ProviderResult<Url> {
    let invalid = |message: String| ProviderError::InvalidBaseUrl {
        url: raw.to_owned(),
        message,
    };
    let url = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("not a hierarchical URL".into()));
    }
    Ok(url)
}

/// Append `segments` to `base`, escaping `/`, `?`, `#` and other reserved
/// characters inside each segment.
fn endpoint(base: &Url, segments: &[&str]) -> ProviderResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ProviderError::InvalidBaseUrl {
            url: base.to_string(),
            message: "not a hierarchical URL".into(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Read-only Google Slides client authenticated as a service account.
#[derive(Clone)]
pub struct GoogleSlidesClient {
    client: Client,
    base_url: Arc<Url>,
    tokens: Arc<TokenSource>,
}

impl GoogleSlidesClient {
    /// Build the HTTP client and parse the signing key. No network call happens here.
    pub fn new(config: GoogleSlidesConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|err| ProviderError::Credential {
                message: format!("failed to build HTTP client: {err}"),
            })?;
        let base_url = parse_base_url(&config.api_base_url)?;
        let tokens = TokenSource::new(client.clone(), config.key)?;

        Ok(Self {
            client,
            base_url: Arc::new(base_url),
            tokens: Arc::new(tokens),
        })
    }

    /// GET the document under `segments`, each one percent-encoded as a
    /// single path segment.
    async fn get_json<T>(&self, segments: &[&str], query: &[(&str, &str)]) -> ProviderResult<T>
    where
        T: DeserializeOwned,
    {
        let url = endpoint(&self.base_url, segments)?;
        let path = segments.join("/");
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|source| ProviderError::RequestSend {
                path: path.clone(),
                source,
            })?;

        match response.status() {
            status if status.is_success() => {
                response
                    .json::<T>()
                    .await
                    .map_err(|source| ProviderError::DecodeResponse { path, source })
            }
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN => {
                debug!(%path, status = %response.status(), "presentation not readable by service account");
                Err(ProviderError::RequestStatus {
                    path,
                    status: response.status(),
                })
            }
            other => Err(ProviderError::RequestStatus {
                path,
                status: other,
            }),
        }
    }
}

impl PresentationProvider for GoogleSlidesClient {
    fn list_slide_ids(&self, presentation_id: String) -> BoxFuture<'static, ProviderResult<Vec<String>>> {
        let client = self.clone();
        Box::pin(async move {
            let document: PresentationDocument = client
                .get_json(
                    &["presentations", presentation_id.as_str()],
                    &[("fields", "slides.objectId")],
                )
                .await?;
            document
                .into_slide_ids()
                .ok_or(ProviderError::NoSlides { presentation_id })
        })
    }

    fn slide_content(
        &self,
        presentation_id: String,
        slide_id: String,
    ) -> BoxFuture<'static, ProviderResult<SlideContent>> {
        let client = self.clone();
        Box::pin(async move {
            let page: PageDocument = client
                .get_json(
                    &["presentations", presentation_id.as_str(), "pages", slide_id.as_str()],
                    &[],
                )
                .await?;
            Ok(page.into())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_escapes_each_segment() {
        let base = parse_base_url(DEFAULT_SLIDES_API_BASE_URL).unwrap();
        let url = endpoint(&base, &["presentations", "a/b c?x#y", "pages", "p1"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://slides.googleapis.com/v1/presentations/a%2Fb%20c%3Fx%23y/pages/p1"
        );
        assert_eq!(url.query(), None);
    }

    #[test]
    fn trailing_slash_on_the_base_is_ignored() {
        let base = parse_base_url("http://127.0.0.1:9000/v1/").unwrap();
        let url = endpoint(&base, &["presentations", "deck"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/v1/presentations/deck");
    }

    #[test]
    fn base_url_must_be_hierarchical() {
        assert!(matches!(
            parse_base_url("mailto:slides@example.com"),
            Err(ProviderError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            parse_base_url("not a url"),
            Err(ProviderError::InvalidBaseUrl { .. })
        ));
    }
}
