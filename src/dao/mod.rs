/// Database model definitions.
pub mod models;
/// Session and player persistence backends.
pub mod session_store;
/// Storage error types shared by the backends.
pub mod storage;
