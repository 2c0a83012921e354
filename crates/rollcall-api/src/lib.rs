//! JSON REST API for rollcall.
//!
//! Exposes an axum [`Router`] backed by any
//! [`rollcall_core::store::AttendanceStore`]. Transport and TLS concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rollcall_api::api_router(store.clone()))
//! ```

pub mod attendance;
pub mod courses;
pub mod error;
pub mod sessions;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use rollcall_core::store::AttendanceStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: AttendanceStore + 'static,
{
  Router::new()
    // Identity
    .route("/users", post(users::register::<S>))
    .route("/login", post(users::login::<S>))
    // Courses and enrollment
    .route("/courses", post(courses::create::<S>).get(courses::list::<S>))
    .route("/courses/{id}/students", get(courses::students::<S>))
    .route("/courses/{id}/enrollments", post(courses::enroll::<S>))
    .route("/courses/{id}/stats", get(courses::stats::<S>))
    .route("/students/{id}/courses", get(courses::of_student::<S>))
    // Session codes
    .route(
      "/courses/{id}/code",
      post(sessions::issue::<S>)
        .get(sessions::active::<S>)
        .delete(sessions::deactivate::<S>),
    )
    // Attendance
    .route("/attendance", post(attendance::mark::<S>))
    .route("/courses/{id}/attendance", get(attendance::for_course::<S>))
    .route("/students/{id}/attendance", get(attendance::history::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use rollcall_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(store))
  }

  async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let req = builder.body(body).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  fn student_body(name: &str, email: &str, student_no: &str) -> Value {
    json!({
      "name": name,
      "email": email,
      "password": "student123",
      "role": "student",
      "student_no": student_no,
      "programme": "Graphic Design",
      "level": "Level 400",
    })
  }

  fn lecturer_body(name: &str, email: &str) -> Value {
    json!({
      "name": name,
      "email": email,
      "password": "lecturer123",
      "role": "lecturer",
    })
  }

  /// Register a lecturer and a student, create a course, return
  /// (student_id, course_id) as JSON strings.
  async fn course_fixture(app: &Router) -> (String, String) {
    let (status, student) = send(
      app,
      "POST",
      "/users",
      Some(student_body("Ama", "ama@example.edu", "BC/22/118")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, lecturer) = send(
      app,
      "POST",
      "/users",
      Some(lecturer_body("Dr. X", "x@example.edu")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, course) = send(
      app,
      "POST",
      "/courses",
      Some(json!({
        "name": "Web Design",
        "code": "GRD302",
        "lecturer_id": lecturer["user_id"],
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    (
      student["user_id"].as_str().unwrap().to_owned(),
      course["course_id"].as_str().unwrap().to_owned(),
    )
  }

  // ── Registration ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_student_returns_created_profile() {
    let app = app().await;
    let (status, body) = send(
      &app,
      "POST",
      "/users",
      Some(student_body("Ama", "ama@example.edu", "BC/22/118")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["student_no"], "BC/22/118");
    assert_eq!(body["role"], "student");
    // Neither the password nor its hash may leak.
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
  }

  #[tokio::test]
  async fn register_student_without_profile_fields_is_rejected() {
    let app = app().await;
    let (status, body) = send(
      &app,
      "POST",
      "/users",
      Some(json!({
        "name": "Ama",
        "email": "ama@example.edu",
        "password": "student123",
        "role": "student",
      })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("required"));
  }

  #[tokio::test]
  async fn register_duplicate_email_conflicts() {
    let app = app().await;
    send(
      &app,
      "POST",
      "/users",
      Some(student_body("A", "same@example.edu", "BC/22/001")),
    )
    .await;
    let (status, _) = send(
      &app,
      "POST",
      "/users",
      Some(student_body("B", "same@example.edu", "BC/22/002")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
  }

  // ── Login ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn login_verifies_the_password() {
    let app = app().await;
    send(
      &app,
      "POST",
      "/users",
      Some(lecturer_body("Dr. X", "x@example.edu")),
    )
    .await;

    let (status, body) = send(
      &app,
      "POST",
      "/login",
      Some(json!({
        "email": "x@example.edu",
        "password": "lecturer123",
        "role": "lecturer",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "x@example.edu");

    let (status, _) = send(
      &app,
      "POST",
      "/login",
      Some(json!({
        "email": "x@example.edu",
        "password": "wrong",
        "role": "lecturer",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
      &app,
      "POST",
      "/login",
      Some(json!({
        "email": "nobody@example.edu",
        "password": "lecturer123",
        "role": "lecturer",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  // ── Courses ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn creating_a_course_enrolls_existing_students() {
    let app = app().await;
    let (student_id, course_id) = course_fixture(&app).await;

    let (status, students) =
      send(&app, "GET", &format!("/courses/{course_id}/students"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(students.as_array().unwrap().len(), 1);
    assert_eq!(students[0]["user_id"], student_id.as_str());

    let (status, courses) =
      send(&app, "GET", &format!("/students/{student_id}/courses"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(courses.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn duplicate_enrollment_conflicts() {
    let app = app().await;
    let (_, course_id) = course_fixture(&app).await;

    // Auto-enrollment already linked the pair.
    let (status, body) = send(
      &app,
      "POST",
      &format!("/courses/{course_id}/enrollments"),
      Some(json!({ "student_no": "BC/22/118" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("enrolled"));
  }

  #[tokio::test]
  async fn enrolling_an_unknown_student_is_not_found() {
    let app = app().await;
    let (_, course_id) = course_fixture(&app).await;

    let (status, _) = send(
      &app,
      "POST",
      &format!("/courses/{course_id}/enrollments"),
      Some(json!({ "student_no": "NO/SUCH/ID" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Session codes and marking ─────────────────────────────────────────────

  #[tokio::test]
  async fn code_and_attendance_flow() {
    let app = app().await;
    let (student_id, course_id) = course_fixture(&app).await;

    // No code yet.
    let (status, body) =
      send(&app, "GET", &format!("/courses/{course_id}/code"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());

    // Marking without a session conflicts.
    let (status, _) = send(
      &app,
      "POST",
      "/attendance",
      Some(json!({
        "student_id": student_id,
        "course_id": course_id,
        "code": "AB2CD",
        "date": "2026-02-17",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Issue a code. The lecturer id is read back off the course.
    let (_, courses) = send(
      &app,
      "GET",
      &format!("/students/{student_id}/courses"),
      None,
    )
    .await;
    let lecturer_id = courses[0]["lecturer_id"].clone();
    let (status, issued) = send(
      &app,
      "POST",
      &format!("/courses/{course_id}/code"),
      Some(json!({ "lecturer_id": lecturer_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let code = issued["code"].as_str().unwrap().to_owned();
    assert_eq!(code.len(), 5);
    assert_eq!(issued["active"], true);

    // A wrong code is rejected.
    let (status, _) = send(
      &app,
      "POST",
      "/attendance",
      Some(json!({
        "student_id": student_id,
        "course_id": course_id,
        "code": "#####",
        "date": "2026-02-17",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // The right code marks once...
    let mark_body = json!({
      "student_id": student_id,
      "course_id": course_id,
      "code": code,
      "date": "2026-02-17",
    });
    let (status, record) =
      send(&app, "POST", "/attendance", Some(mark_body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["date"], "2026-02-17");
    assert_eq!(record["status"], "present");

    // ...and only once per day.
    let (status, _) =
      send(&app, "POST", "/attendance", Some(mark_body)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // History shows the single record joined with its course.
    let (status, history) = send(
      &app,
      "GET",
      &format!("/students/{student_id}/attendance"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["course"]["code"], "GRD302");

    // Stats: 1 session, 1 attendance, 1 enrolled student.
    let (status, stats) =
      send(&app, "GET", &format!("/courses/{course_id}/stats"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_sessions"], 1);
    assert_eq!(stats["total_attendances"], 1);
    assert_eq!(stats["enrolled_students"], 1);
    assert_eq!(stats["average_attendance"], 100.0);

    // Deactivate, then marking a later day conflicts again.
    let (status, _) =
      send(&app, "DELETE", &format!("/courses/{course_id}/code"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(
      &app,
      "POST",
      "/attendance",
      Some(json!({
        "student_id": student_id,
        "course_id": course_id,
        "code": code,
        "date": "2026-02-18",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn course_attendance_supports_a_date_range() {
    let app = app().await;
    let (student_id, course_id) = course_fixture(&app).await;

    let (_, courses) = send(
      &app,
      "GET",
      &format!("/students/{student_id}/courses"),
      None,
    )
    .await;
    let (_, issued) = send(
      &app,
      "POST",
      &format!("/courses/{course_id}/code"),
      Some(json!({ "lecturer_id": courses[0]["lecturer_id"] })),
    )
    .await;
    let code = issued["code"].as_str().unwrap();

    for day in ["2026-02-16", "2026-02-17", "2026-02-19"] {
      let (status, _) = send(
        &app,
        "POST",
        "/attendance",
        Some(json!({
          "student_id": student_id,
          "course_id": course_id,
          "code": code,
          "date": day,
        })),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED);
    }

    let (status, records) = send(
      &app,
      "GET",
      &format!(
        "/courses/{course_id}/attendance?from=2026-02-17&to=2026-02-19"
      ),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(records.as_array().unwrap().len(), 2);
    // Each record carries the submitting student's profile.
    assert_eq!(records[0]["student"]["student_no"], "BC/22/118");
  }
}
