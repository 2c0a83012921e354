//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; calendar dates as fixed-width
//! `YYYY-MM-DD` (which is what makes lexicographic range filters in SQL
//! valid). UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use rollcall_core::{
  Error, Result,
  attendance::{AttendanceRecord, AttendanceStatus},
  course::Course,
  session::SessionCode,
  user::{Role, StudentProfile, User},
};
use uuid::Uuid;

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Uuid::parse_str(s).map_err(Error::storage)
}

// ─── Timestamps and dates ────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(Error::storage)
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(Error::storage)
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::Student => "student",
    Role::Lecturer => "lecturer",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "student" => Ok(Role::Student),
    "lecturer" => Ok(Role::Lecturer),
    other => Err(Error::storage(format!("unknown role: {other:?}"))),
  }
}

// ─── AttendanceStatus ────────────────────────────────────────────────────────

pub fn encode_status(s: AttendanceStatus) -> &'static str {
  match s {
    AttendanceStatus::Present => "present",
  }
}

pub fn decode_status(s: &str) -> Result<AttendanceStatus> {
  match s {
    "present" => Ok(AttendanceStatus::Present),
    other => Err(Error::storage(format!("unknown status: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub name:       String,
  pub email:      String,
  pub role:       String,
  pub student_no: Option<String>,
  pub programme:  Option<String>,
  pub level:      Option<String>,
}

impl RawUser {
  /// Read seven columns starting at `base`; `base` is non-zero when the row
  /// is a join and the user columns sit after another table's.
  pub fn from_row(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:    row.get(base)?,
      name:       row.get(base + 1)?,
      email:      row.get(base + 2)?,
      role:       row.get(base + 3)?,
      student_no: row.get(base + 4)?,
      programme:  row.get(base + 5)?,
      level:      row.get(base + 6)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    let role = decode_role(&self.role)?;
    let student = match (self.student_no, self.programme, self.level) {
      (Some(student_no), Some(programme), Some(level)) => {
        Some(StudentProfile { student_no, programme, level })
      }
      _ => None,
    };
    Ok(User {
      user_id: decode_uuid(&self.user_id)?,
      name: self.name,
      email: self.email,
      role,
      student,
    })
  }
}

/// Raw strings read directly from a `courses` row.
pub struct RawCourse {
  pub course_id:   String,
  pub name:        String,
  pub code:        String,
  pub lecturer_id: String,
}

impl RawCourse {
  pub fn from_row(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      course_id:   row.get(base)?,
      name:        row.get(base + 1)?,
      code:        row.get(base + 2)?,
      lecturer_id: row.get(base + 3)?,
    })
  }

  pub fn into_course(self) -> Result<Course> {
    Ok(Course {
      course_id:   decode_uuid(&self.course_id)?,
      name:        self.name,
      code:        self.code,
      lecturer_id: decode_uuid(&self.lecturer_id)?,
    })
  }
}

/// Raw strings read directly from a `session_codes` row.
pub struct RawCode {
  pub code_id:     String,
  pub course_id:   String,
  pub lecturer_id: String,
  pub code:        String,
  pub active:      bool,
  pub created_at:  String,
}

impl RawCode {
  pub fn from_row(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      code_id:     row.get(base)?,
      course_id:   row.get(base + 1)?,
      lecturer_id: row.get(base + 2)?,
      code:        row.get(base + 3)?,
      active:      row.get(base + 4)?,
      created_at:  row.get(base + 5)?,
    })
  }

  pub fn into_code(self) -> Result<SessionCode> {
    Ok(SessionCode {
      code_id:     decode_uuid(&self.code_id)?,
      course_id:   decode_uuid(&self.course_id)?,
      lecturer_id: decode_uuid(&self.lecturer_id)?,
      code:        self.code,
      active:      self.active,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `attendance` row.
pub struct RawRecord {
  pub record_id:   String,
  pub student_id:  String,
  pub course_id:   String,
  pub date:        String,
  pub status:      String,
  pub recorded_at: String,
}

impl RawRecord {
  pub fn from_row(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      record_id:   row.get(base)?,
      student_id:  row.get(base + 1)?,
      course_id:   row.get(base + 2)?,
      date:        row.get(base + 3)?,
      status:      row.get(base + 4)?,
      recorded_at: row.get(base + 5)?,
    })
  }

  pub fn into_record(self) -> Result<AttendanceRecord> {
    Ok(AttendanceRecord {
      record_id:   decode_uuid(&self.record_id)?,
      student_id:  decode_uuid(&self.student_id)?,
      course_id:   decode_uuid(&self.course_id)?,
      date:        decode_date(&self.date)?,
      status:      decode_status(&self.status)?,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}
