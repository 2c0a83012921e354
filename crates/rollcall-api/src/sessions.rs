//! Handlers for session-code endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/courses/:id/code` | Issue; deactivates the predecessor |
//! | `GET`    | `/courses/:id/code` | `null` body when nothing is active |
//! | `DELETE` | `/courses/:id/code` | Idempotent |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use rollcall_core::{session::SessionCode, store::AttendanceStore};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct IssueBody {
  pub lecturer_id: Uuid,
}

/// `POST /courses/:id/code`
pub async fn issue<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<IssueBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AttendanceStore,
{
  let code = store.issue_code(id, body.lecturer_id).await?;
  Ok((StatusCode::CREATED, Json(code)))
}

/// `GET /courses/:id/code` — "no active code" is a normal state, not an
/// error, so it serialises as `null` rather than a 404.
pub async fn active<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Option<SessionCode>>, ApiError>
where
  S: AttendanceStore,
{
  Ok(Json(store.active_code(id).await?))
}

/// `DELETE /courses/:id/code`
pub async fn deactivate<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AttendanceStore,
{
  store.deactivate_code(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
