//! Extractors whose rejections use the API error body.
//!
//! axum's own extractors answer malformed input with a plain-text 4xx.
//! These wrappers route the rejection through `ApiError`, so a bad id, a
//! bad date or broken JSON comes back as a 400 `VALIDATION_ERROR`.

use axum::extract::{FromRequest, FromRequestParts};

use super::error::ApiError;

/// JSON request body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Path parameters
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);

/// Query string
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);
