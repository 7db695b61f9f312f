//! A JSON body extractor that reports malformed bodies as [Error::InvalidInput].

use axum::extract::FromRequest;

use crate::Error;

/// Like [axum::Json], but a body that cannot be parsed is rejected with a
/// 400 response in the same `{"error": ...}` shape as every other error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct AppJson<T>(pub T);
