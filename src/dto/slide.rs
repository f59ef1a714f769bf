//! Payloads of the `/api/currentSlide` routes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::slides::SlideContent;

/// Request moving the session to another slide.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetSlideIndexRequest {
    /// Zero-based target index; required.
    #[serde(default)]
    pub slide_index: Option<i64>,
}

/// Slide currently shown to the session.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSlideResponse {
    /// Zero-based index of the slide.
    pub slide_index: usize,
    /// Fresh content of the slide.
    pub slide: SlideContent,
}
