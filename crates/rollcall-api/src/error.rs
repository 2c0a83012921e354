//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use rollcall_core::Error as DomainError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// A domain failure from the store; mapped to a status per variant.
  #[error(transparent)]
  Domain(#[from] DomainError),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// Login failed. One message for both unknown email and wrong password.
  #[error("invalid email or password")]
  Unauthorized,

  #[error("password hashing failed")]
  Hashing,
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match self {
      ApiError::Domain(e) => match e {
        DomainError::UserNotFound(_)
        | DomainError::StudentNotFound(_)
        | DomainError::CourseNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Duplicate(_)
        | DomainError::NoActiveSession
        | DomainError::AlreadyMarked => StatusCode::CONFLICT,
        DomainError::InvalidCode => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::Hashing => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
