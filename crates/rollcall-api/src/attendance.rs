//! Handlers for attendance endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/attendance` | Redeem a code; `date` defaults to the server's UTC day |
//! | `GET`  | `/students/:id/attendance` | History, newest date first |
//! | `GET`  | `/courses/:id/attendance?from=&to=` | Inclusive date range |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use rollcall_core::{
  attendance::{AttendanceEntry, CourseAttendee},
  store::AttendanceStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Mark ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MarkBody {
  pub student_id: Uuid,
  pub course_id:  Uuid,
  pub code:       String,
  /// The calendar day to record against. Whose "today" this is (device-local
  /// or session-local) is the caller's decision; when omitted, the server's
  /// current UTC date is used.
  pub date:       Option<NaiveDate>,
}

/// `POST /attendance`
pub async fn mark<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<MarkBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AttendanceStore,
{
  let today = body.date.unwrap_or_else(|| Utc::now().date_naive());
  let record = store
    .mark(body.student_id, body.course_id, &body.code, today)
    .await?;
  Ok((StatusCode::CREATED, Json(record)))
}

// ─── Views ────────────────────────────────────────────────────────────────────

/// `GET /students/:id/attendance`
pub async fn history<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<AttendanceEntry>>, ApiError>
where
  S: AttendanceStore,
{
  Ok(Json(store.history_for(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct RangeParams {
  pub from: Option<NaiveDate>,
  pub to:   Option<NaiveDate>,
}

/// `GET /courses/:id/attendance?from=YYYY-MM-DD&to=YYYY-MM-DD`
pub async fn for_course<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<RangeParams>,
) -> Result<Json<Vec<CourseAttendee>>, ApiError>
where
  S: AttendanceStore,
{
  Ok(Json(
    store.records_for_course(id, params.from, params.to).await?,
  ))
}
