/// Request extractors
///
/// [`ApiJson`] behaves like `axum::Json` but rejects malformed bodies with our
/// `ApiError` (400 `bad_request`) instead of axum's plain-text 400/415/422.
/// [`ApiPath`] does the same for path parameters such as a malformed UUID.

use axum::extract::{FromRequest, FromRequestParts};
use serde::{Deserialize, Deserializer};

use crate::error::ApiError;

/// JSON body extractor with `ApiError` rejections
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameter extractor with `ApiError` rejections
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Deserializes a field that distinguishes "absent" from "null"
///
/// Use with `#[serde(default, deserialize_with = "double_option")]` on an
/// `Option<Option<T>>`: a missing field stays `None`, an explicit `null`
/// becomes `Some(None)`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
