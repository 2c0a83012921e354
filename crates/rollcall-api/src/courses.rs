//! Handlers for course, enrollment, and stats endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/courses` | Body: `{"name", "code", "lecturer_id"}` |
//! | `GET`  | `/courses?lecturer_id=<id>` | Courses owned by a lecturer |
//! | `GET`  | `/courses/:id/students` | Enrolled students |
//! | `POST` | `/courses/:id/enrollments` | Body: `{"student_no"}` |
//! | `GET`  | `/courses/:id/stats` | Recomputed per call |
//! | `GET`  | `/students/:id/courses` | A student's courses |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use rollcall_core::{
  attendance::CourseStats,
  course::{Course, NewCourse},
  store::AttendanceStore,
  user::User,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:        String,
  pub code:        String,
  pub lecturer_id: Uuid,
}

/// `POST /courses` — also enrolls every current student into the new course.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AttendanceStore,
{
  let course = store
    .create_course(NewCourse {
      name:        body.name,
      code:        body.code,
      lecturer_id: body.lecturer_id,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(course)))
}

// ─── List by lecturer ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub lecturer_id: Uuid,
}

/// `GET /courses?lecturer_id=<id>`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Course>>, ApiError>
where
  S: AttendanceStore,
{
  Ok(Json(store.courses_of_lecturer(params.lecturer_id).await?))
}

// ─── Roster ───────────────────────────────────────────────────────────────────

/// `GET /courses/:id/students`
pub async fn students<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: AttendanceStore,
{
  Ok(Json(store.students_of(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct EnrollBody {
  /// The human-facing student identifier, not the opaque user id.
  pub student_no: String,
}

/// `POST /courses/:id/enrollments` — returns the resolved student profile.
pub async fn enroll<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<EnrollBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AttendanceStore,
{
  let student = store.enroll(&body.student_no, id).await?;
  Ok((StatusCode::CREATED, Json(student)))
}

/// `GET /students/:id/courses`
pub async fn of_student<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Course>>, ApiError>
where
  S: AttendanceStore,
{
  Ok(Json(store.courses_of(id).await?))
}

// ─── Stats ────────────────────────────────────────────────────────────────────

/// `GET /courses/:id/stats`
pub async fn stats<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<CourseStats>, ApiError>
where
  S: AttendanceStore,
{
  Ok(Json(store.stats_for(id).await?))
}
