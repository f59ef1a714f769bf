//! Library crate for trivia-back, exposing modules for binaries and integration tests.

pub mod config;
/// Persistence layer: entities, store trait and database backends.
pub mod dao;
/// Request and response bodies of the HTTP API.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// Axum routers and handlers.
pub mod routes;
/// Business logic invoked by the handlers.
pub mod services;
pub mod slides;
/// Shared application state.
pub mod state;

#[cfg(test)]
mod test_support;
