//! Google Slides implementation of [`PresentationProvider`](super::PresentationProvider).

mod auth;
mod client;
mod models;

pub use auth::{ServiceAccountKey, TokenSource};
pub use client::{GoogleSlidesClient, GoogleSlidesConfig};
