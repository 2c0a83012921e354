//! The `AttendanceStore` trait — the repository abstraction every other
//! crate programs against.
//!
//! The trait is implemented by storage backends (e.g.
//! `rollcall-store-sqlite`). Higher layers depend on this abstraction, not on
//! any concrete backend. Each mutating operation is a single atomic change:
//! it either fully commits its invariant-preserving write or makes none.
//!
//! The error type is fixed to [`crate::Error`] rather than left associated:
//! domain failures (duplicate enrollment, stale code, already-marked day) are
//! part of the contract and must keep their tags through any backend so the
//! caller can tell them apart from storage faults.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  Result,
  attendance::{AttendanceEntry, AttendanceRecord, CourseAttendee, CourseStats},
  course::{Course, NewCourse},
  session::SessionCode,
  user::{Credential, NewUser, Role, User},
};

pub trait AttendanceStore: Send + Sync {
  // ── Identity ──────────────────────────────────────────────────────────

  /// Register a user and return the persisted profile.
  ///
  /// Registering a student also enrolls them into every existing course, in
  /// the same transaction. Fails with [`crate::Error::Duplicate`] when the
  /// (email, role) pair or the student identifier is taken.
  fn register_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User>> + Send + '_;

  /// Retrieve a user by opaque id. Returns `None` if not found.
  fn user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>>> + Send + '_;

  /// Look up a user and their stored password hash for login verification.
  fn credential<'a>(
    &'a self,
    email: &'a str,
    role: Role,
  ) -> impl Future<Output = Result<Option<Credential>>> + Send + 'a;

  // ── Courses ───────────────────────────────────────────────────────────

  /// Create a course owned by `input.lecturer_id` and enroll every current
  /// student into it, in the same transaction.
  fn create_course(
    &self,
    input: NewCourse,
  ) -> impl Future<Output = Result<Course>> + Send + '_;

  /// Retrieve a course by id. Returns `None` if not found.
  fn course(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Course>>> + Send + '_;

  /// All courses owned by a lecturer.
  fn courses_of_lecturer(
    &self,
    lecturer_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Course>>> + Send + '_;

  // ── Enrollment ────────────────────────────────────────────────────────

  /// Enroll a student, resolved by their human-facing identifier, into a
  /// course. Returns the resolved profile on success.
  fn enroll<'a>(
    &'a self,
    student_no: &'a str,
    course_id: Uuid,
  ) -> impl Future<Output = Result<User>> + Send + 'a;

  /// Students enrolled in a course.
  fn students_of(
    &self,
    course_id: Uuid,
  ) -> impl Future<Output = Result<Vec<User>>> + Send + '_;

  /// Courses a student is enrolled in.
  fn courses_of(
    &self,
    student_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Course>>> + Send + '_;

  // ── Session codes ─────────────────────────────────────────────────────

  /// Issue a fresh code for a course, deactivating any predecessor in the
  /// same transaction. The new code is the course's single active code.
  fn issue_code(
    &self,
    course_id: Uuid,
    lecturer_id: Uuid,
  ) -> impl Future<Output = Result<SessionCode>> + Send + '_;

  /// The course's currently-active code, if any. Pure read.
  fn active_code(
    &self,
    course_id: Uuid,
  ) -> impl Future<Output = Result<Option<SessionCode>>> + Send + '_;

  /// Deactivate the course's active code. Idempotent; a second call is a
  /// harmless no-op.
  fn deactivate_code(
    &self,
    course_id: Uuid,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  // ── Attendance ────────────────────────────────────────────────────────

  /// Redeem a session code, appending one record for
  /// (`student_id`, `course_id`, `today`).
  ///
  /// This is the sole write path into the ledger. Retries of the same triple
  /// fail with [`crate::Error::AlreadyMarked`] and leave the record count at
  /// one — the backend's uniqueness constraint holds even if the duplicate
  /// check is raced.
  fn mark<'a>(
    &'a self,
    student_id: Uuid,
    course_id: Uuid,
    presented_code: &'a str,
    today: NaiveDate,
  ) -> impl Future<Output = Result<AttendanceRecord>> + Send + 'a;

  /// All of a student's records, each joined with its course, newest date
  /// first (ties in a stable arbitrary order).
  fn history_for(
    &self,
    student_id: Uuid,
  ) -> impl Future<Output = Result<Vec<AttendanceEntry>>> + Send + '_;

  /// All of a course's records, each joined with the submitting student,
  /// optionally restricted to an inclusive date range.
  fn records_for_course(
    &self,
    course_id: Uuid,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
  ) -> impl Future<Output = Result<Vec<CourseAttendee>>> + Send + '_;

  // ── Stats ─────────────────────────────────────────────────────────────

  /// Per-course aggregate, recomputed from the ledger on every call.
  fn stats_for(
    &self,
    course_id: Uuid,
  ) -> impl Future<Output = Result<CourseStats>> + Send + '_;
}
