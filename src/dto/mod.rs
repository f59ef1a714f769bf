/// Health check payloads.
pub mod health;
/// Player membership and answer payloads.
pub mod player;
/// Session lifecycle payloads.
pub mod session;
/// Current slide payloads.
pub mod slide;
/// Custom validators for request fields.
pub mod validation;
