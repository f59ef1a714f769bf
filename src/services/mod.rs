/// Random allocation of free session codes.
pub mod allocator;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Joining sessions, answers and the answer board.
pub mod player_service;
/// Session lifecycle operations.
pub mod session_service;
/// Current slide and slide-ID cache.
pub mod slide_service;
