//! Attendance records and the derived per-course statistics.
//!
//! A record is an immutable "was present" event. Absence is the complement
//! and is never stored. At most one record exists per
//! (student, course, date); the storage backend enforces this.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{course::Course, user::User};

/// The status written on every record. Only presence is ever recorded, but
/// the column exists in storage, so the value is typed rather than implied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
  #[default]
  Present,
}

/// One redemption event. Never mutated or deleted once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
  pub record_id:   Uuid,
  pub student_id:  Uuid,
  pub course_id:   Uuid,
  /// Caller-supplied calendar date ("today"); stored as fixed-width
  /// `YYYY-MM-DD`, which makes lexicographic range filters valid.
  pub date:        NaiveDate,
  pub status:      AttendanceStatus,
  /// Server-assigned creation instant.
  pub recorded_at: DateTime<Utc>,
}

/// A record joined with its course, for a student's history view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceEntry {
  #[serde(flatten)]
  pub record: AttendanceRecord,
  pub course: Course,
}

/// A record joined with the submitting student's profile, for a course view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseAttendee {
  #[serde(flatten)]
  pub record:  AttendanceRecord,
  pub student: User,
}

// ─── Stats ───────────────────────────────────────────────────────────────────

/// Per-course aggregate, recomputed on every call.
///
/// A "session" is inferred, not modelled: it is a distinct calendar date on
/// which at least one record exists for the course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseStats {
  pub total_sessions:     u64,
  pub total_attendances:  u64,
  pub enrolled_students:  u64,
  /// Percentage in `[0, 100]`; `0` when there are no sessions or no
  /// enrolled students.
  pub average_attendance: f64,
}

impl CourseStats {
  /// Derive the aggregate from raw counts, guarding the zero denominators.
  pub fn from_counts(
    total_sessions: u64,
    total_attendances: u64,
    enrolled_students: u64,
  ) -> Self {
    let average_attendance = if total_sessions == 0 || enrolled_students == 0 {
      0.0
    } else {
      total_attendances as f64 / (total_sessions * enrolled_students) as f64
        * 100.0
    };
    Self {
      total_sessions,
      total_attendances,
      enrolled_students,
      average_attendance,
    }
  }
}
