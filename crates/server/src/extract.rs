//! Request extractors whose rejections use the API's error shape.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` that rejects malformed bodies with a 400 `{"message"}`.
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
