use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Trivia Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sessions::create_session,
        crate::routes::sessions::get_session,
        crate::routes::sessions::update_session,
        crate::routes::sessions::delete_session,
        crate::routes::players::join_session,
        crate::routes::players::submit_answer,
        crate::routes::players::clear_answers,
        crate::routes::answers::list_answers,
        crate::routes::slides::get_current_slide,
        crate::routes::slides::set_slide_index,
        crate::routes::slides::reset_slide_cache,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::session::CreateSessionRequest,
            crate::dto::session::SessionCreatedResponse,
            crate::dto::session::SessionView,
            crate::dto::session::UpdateSessionRequest,
            crate::dto::session::SessionUpdatedResponse,
            crate::dto::session::ActionResponse,
            crate::dto::player::JoinSessionRequest,
            crate::dto::player::JoinSessionResponse,
            crate::dto::player::PlayerView,
            crate::dto::player::SubmitAnswerRequest,
            crate::dto::player::ClearAnswersRequest,
            crate::dto::player::ClearAnswersResponse,
            crate::dto::player::AnswerView,
            crate::dto::slide::SetSlideIndexRequest,
            crate::dto::slide::CurrentSlideResponse,
            crate::slides::SlideContent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sessions", description = "Host session lifecycle"),
        (name = "players", description = "Joining sessions and submitting answers"),
        (name = "slides", description = "Current slide of the linked presentation"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/healthcheck",
            "/api/sessions",
            "/api/sessions/{id}",
            "/api/players",
            "/api/players/{id}",
            "/api/players/clear",
            "/api/answers/{id}",
            "/api/currentSlide/{id}",
            "/api/currentSlide/{id}/cache",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
