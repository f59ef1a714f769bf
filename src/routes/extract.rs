use axum::extract::FromRequest;

use crate::error::AppError;

/// JSON body extractor whose rejections render as `{ "message": ... }` with status 400.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
