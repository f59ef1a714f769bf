use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::session::{
        ActionResponse, CreateSessionRequest, SessionCreatedResponse, SessionUpdatedResponse,
        SessionView, UpdateSessionRequest,
    },
    error::AppError,
    routes::extract::ApiJson,
    services::session_service,
    state::SharedState,
};

/// Host endpoints managing the lifecycle of a session.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/sessions", post(create_session))
        .route(
            "/api/sessions/{id}",
            get(get_session).patch(update_session).delete(delete_session),
        )
}

/// Open a new session under a random four digit code.
#[utoipa::path(
    post,
    path = "/api/sessions",
    tag = "sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created", body = SessionCreatedResponse),
        (status = 400, description = "Missing host or session name"),
        (status = 500, description = "No free session code found")
    )
)]
pub async fn create_session(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionCreatedResponse>), AppError> {
    payload.validate()?;
    let created = session_service::create_session(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/sessions/{id}",
    tag = "sessions",
    params(("id" = String, Path, description = "Four digit session code")),
    responses(
        (status = 200, description = "Session", body = SessionView),
        (status = 400, description = "Malformed session code"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(session_service::get_session(&state, &id).await?))
}

/// Open or close polling and link, relink or unlink the presentation.
#[utoipa::path(
    patch,
    path = "/api/sessions/{id}",
    tag = "sessions",
    params(("id" = String, Path, description = "Four digit session code")),
    request_body = UpdateSessionRequest,
    responses(
        (status = 200, description = "Session updated", body = SessionUpdatedResponse),
        (status = 400, description = "No valid fields to update"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn update_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateSessionRequest>,
) -> Result<Json<SessionUpdatedResponse>, AppError> {
    Ok(Json(
        session_service::update_session(&state, &id, payload).await?,
    ))
}

/// Delete the session along with its players.
#[utoipa::path(
    delete,
    path = "/api/sessions/{id}",
    tag = "sessions",
    params(("id" = String, Path, description = "Four digit session code")),
    responses(
        (status = 200, description = "Session deleted", body = ActionResponse),
        (status = 404, description = "Session not found")
    )
)]
pub async fn delete_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    session_service::delete_session(&state, &id).await?;
    Ok(Json(ActionResponse {
        message: "Session deleted successfully".into(),
    }))
}
