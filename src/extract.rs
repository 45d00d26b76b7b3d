//! Request extractors whose rejections render as `AppError` JSON bodies.
//!
//! axum's own `Json`, `Query` and `Path` reject with plain text (and 422 for a
//! body that parses but does not fit the type). These wrappers run the same
//! extraction and report every failure as a 400 `{"error": ...}`.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JsonBody
///
/// `axum::Json` for request payloads. Responses still use `axum::Json`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);
