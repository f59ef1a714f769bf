use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};

use crate::{
    dto::slide::{CurrentSlideResponse, SetSlideIndexRequest},
    error::AppError,
    routes::extract::ApiJson,
    services::slide_service,
    state::SharedState,
};

/// Current slide endpoints backed by the linked presentation.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/api/currentSlide/{id}",
            get(get_current_slide).patch(set_slide_index),
        )
        .route("/api/currentSlide/{id}/cache", delete(reset_slide_cache))
}

/// Content of the slide the session currently shows.
#[utoipa::path(
    get,
    path = "/api/currentSlide/{id}",
    tag = "slides",
    params(("id" = String, Path, description = "Four digit session code")),
    responses(
        (status = 200, description = "Current slide", body = CurrentSlideResponse),
        (status = 404, description = "Session or presentation not found"),
        (status = 500, description = "Presentation provider failure")
    )
)]
pub async fn get_current_slide(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<CurrentSlideResponse>, AppError> {
    Ok(Json(slide_service::get_current_slide(&state, &id).await?))
}

/// Move the session to another slide and return its content.
#[utoipa::path(
    patch,
    path = "/api/currentSlide/{id}",
    tag = "slides",
    params(("id" = String, Path, description = "Four digit session code")),
    request_body = SetSlideIndexRequest,
    responses(
        (status = 200, description = "Slide changed", body = CurrentSlideResponse),
        (status = 400, description = "Missing or out-of-range slideIndex"),
        (status = 404, description = "Session or presentation not found"),
        (status = 500, description = "Presentation provider failure")
    )
)]
pub async fn set_slide_index(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<SetSlideIndexRequest>,
) -> Result<Json<CurrentSlideResponse>, AppError> {
    Ok(Json(
        slide_service::set_slide_index(&state, &id, payload).await?,
    ))
}

/// Drop the cached slide IDs so the next read refetches them.
#[utoipa::path(
    delete,
    path = "/api/currentSlide/{id}/cache",
    tag = "slides",
    params(("id" = String, Path, description = "Four digit session code")),
    responses(
        (status = 204, description = "Cache cleared"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn reset_slide_cache(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    slide_service::reset_slide_cache(&state, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
