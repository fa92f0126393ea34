//! Extractors whose rejections come back as the usual `{"success": false, "error": ...}` body.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::SalonError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(SalonError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(SalonError))]
pub struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(SalonError))]
pub struct ApiQuery<T>(pub T);
