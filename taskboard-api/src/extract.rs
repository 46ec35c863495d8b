/// Request extractors that reject in the API's JSON error format
///
/// Drop-in replacements for axum's `Json`, `Path` and `Query`. A body that
/// does not parse, a path segment that is not a UUID or a bad query string
/// becomes an [`ApiError`] (`{ "error", "message", "details"? }`) instead of
/// axum's plain-text rejection.
///
/// `Json` also works as a response, exactly like `axum::Json`.

use axum::{
    extract::{FromRequest, FromRequestParts},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Query<T>(pub T);
