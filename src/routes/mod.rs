use axum::Router;

use crate::state::SharedState;

/// Answer board.
pub mod answers;
/// Swagger UI and the OpenAPI document.
pub mod docs;
/// JSON extractor reporting rejections as API errors.
pub mod extract;
/// Health check.
pub mod health;
/// Joining and answering.
pub mod players;
/// Session lifecycle.
pub mod sessions;
/// Current slide and its cache.
pub mod slides;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sessions::router())
        .merge(players::router())
        .merge(answers::router())
        .merge(slides::router());

    api_router.merge(docs::router()).with_state(state)
}
