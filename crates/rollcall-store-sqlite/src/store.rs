//! [`SqliteStore`] — the SQLite implementation of
//! [`AttendanceStore`](rollcall_core::store::AttendanceStore).
//!
//! Every mutating operation runs as one transaction on the connection
//! thread: the duplicate/uniqueness rules hold at the storage level, and a
//! failed operation leaves no partial write behind.

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use rollcall_core::{
  DuplicateKind, Error, Result,
  attendance::{
    AttendanceEntry, AttendanceRecord, AttendanceStatus, CourseAttendee,
    CourseStats,
  },
  course::{Course, NewCourse},
  session::{self, SessionCode},
  store::AttendanceStore,
  user::{Credential, NewUser, Role, User},
};

use crate::{
  encode::{
    RawCode, RawCourse, RawRecord, RawUser, encode_date, encode_dt,
    encode_role, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Error plumbing ──────────────────────────────────────────────────────────

/// Smuggle a domain error out of a `conn.call` closure.
fn domain(e: Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}

/// Recover the domain error on the other side, or wrap the backend fault.
fn lift(e: tokio_rusqlite::Error) -> Error {
  match e {
    tokio_rusqlite::Error::Other(inner) => match inner.downcast::<Error>() {
      Ok(domain) => *domain,
      Err(other) => Error::storage(other),
    },
    other => Error::storage(other),
  }
}

/// Did this insert trip a UNIQUE constraint (or the primary key, which is the
/// identity of existence-only relations)?
fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        || f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An attendance store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(Error::storage)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(Error::storage)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(lift)
  }
}

// ─── AttendanceStore impl ────────────────────────────────────────────────────

impl AttendanceStore for SqliteStore {
  // ── Identity ──────────────────────────────────────────────────────────────

  async fn register_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id: Uuid::new_v4(),
      name:    input.name.clone(),
      email:   input.email.clone(),
      role:    input.role(),
      student: input.profile().cloned(),
    };

    let id_str   = encode_uuid(user.user_id);
    let name     = input.name;
    let email    = input.email;
    let hash     = input.password_hash;
    let role_str = encode_role(user.role).to_owned();
    let profile  = user.student.clone();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let email_taken: bool = tx
          .query_row(
            "SELECT 1 FROM users WHERE email = ?1 AND role = ?2",
            rusqlite::params![email, role_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if email_taken {
          return Err(domain(Error::Duplicate(DuplicateKind::EmailRole)));
        }

        if let Some(p) = &profile {
          let no_taken: bool = tx
            .query_row(
              "SELECT 1 FROM users WHERE student_no = ?1",
              rusqlite::params![p.student_no],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
          if no_taken {
            return Err(domain(Error::Duplicate(DuplicateKind::StudentNo)));
          }
        }

        tx.execute(
          "INSERT INTO users (
             user_id, name, email, password_hash, role,
             student_no, programme, level
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            name,
            email,
            hash,
            role_str,
            profile.as_ref().map(|p| p.student_no.as_str()),
            profile.as_ref().map(|p| p.programme.as_str()),
            profile.as_ref().map(|p| p.level.as_str()),
          ],
        )?;

        // A new student joins every existing course.
        if profile.is_some() {
          let course_ids: Vec<String> = {
            let mut stmt = tx.prepare("SELECT course_id FROM courses")?;
            let ids = stmt
              .query_map([], |row| row.get(0))?
              .collect::<rusqlite::Result<Vec<_>>>()?;
            ids
          };
          for course_id in course_ids {
            tx.execute(
              "INSERT INTO enrollments (student_id, course_id) VALUES (?1, ?2)",
              rusqlite::params![id_str, course_id],
            )?;
          }
        }

        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(lift)?;

    Ok(user)
  }

  async fn user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, name, email, role, student_no, programme, level
               FROM users WHERE user_id = ?1",
              rusqlite::params![id_str],
              |row| RawUser::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await
      .map_err(lift)?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn credential(
    &self,
    email: &str,
    role: Role,
  ) -> Result<Option<Credential>> {
    let email    = email.to_owned();
    let role_str = encode_role(role).to_owned();

    let raw: Option<(RawUser, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, name, email, role, student_no, programme, level,
                      password_hash
               FROM users WHERE email = ?1 AND role = ?2",
              rusqlite::params![email, role_str],
              |row| Ok((RawUser::from_row(row, 0)?, row.get(7)?)),
            )
            .optional()?,
        )
      })
      .await
      .map_err(lift)?;

    match raw {
      Some((raw_user, password_hash)) => Ok(Some(Credential {
        user: raw_user.into_user()?,
        password_hash,
      })),
      None => Ok(None),
    }
  }

  // ── Courses ───────────────────────────────────────────────────────────────

  async fn create_course(&self, input: NewCourse) -> Result<Course> {
    let course = Course {
      course_id:   Uuid::new_v4(),
      name:        input.name,
      code:        input.code,
      lecturer_id: input.lecturer_id,
    };

    let id_str       = encode_uuid(course.course_id);
    let name         = course.name.clone();
    let code         = course.code.clone();
    let lecturer_str = encode_uuid(course.lecturer_id);
    let lecturer_id  = course.lecturer_id;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let lecturer_exists: bool = tx
          .query_row(
            "SELECT 1 FROM users WHERE user_id = ?1 AND role = 'lecturer'",
            rusqlite::params![lecturer_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !lecturer_exists {
          return Err(domain(Error::UserNotFound(lecturer_id)));
        }

        tx.execute(
          "INSERT INTO courses (course_id, name, code, lecturer_id)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, code, lecturer_str],
        )?;

        // Every current student joins the new course.
        let student_ids: Vec<String> = {
          let mut stmt =
            tx.prepare("SELECT user_id FROM users WHERE role = 'student'")?;
          let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          ids
        };
        for student_id in student_ids {
          tx.execute(
            "INSERT INTO enrollments (student_id, course_id) VALUES (?1, ?2)",
            rusqlite::params![student_id, id_str],
          )?;
        }

        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(lift)?;

    Ok(course)
  }

  async fn course(&self, id: Uuid) -> Result<Option<Course>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCourse> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT course_id, name, code, lecturer_id
               FROM courses WHERE course_id = ?1",
              rusqlite::params![id_str],
              |row| RawCourse::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await
      .map_err(lift)?;

    raw.map(RawCourse::into_course).transpose()
  }

  async fn courses_of_lecturer(&self, lecturer_id: Uuid) -> Result<Vec<Course>> {
    let lecturer_str = encode_uuid(lecturer_id);

    let raws: Vec<RawCourse> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT course_id, name, code, lecturer_id
           FROM courses WHERE lecturer_id = ?1
           ORDER BY name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![lecturer_str], |row| {
            RawCourse::from_row(row, 0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(lift)?;

    raws.into_iter().map(RawCourse::into_course).collect()
  }

  // ── Enrollment ────────────────────────────────────────────────────────────

  async fn enroll(&self, student_no: &str, course_id: Uuid) -> Result<User> {
    let student_no = student_no.to_owned();
    let course_str = encode_uuid(course_id);

    let raw: RawUser = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let found = tx
          .query_row(
            "SELECT user_id, name, email, role, student_no, programme, level
             FROM users WHERE student_no = ?1 AND role = 'student'",
            rusqlite::params![student_no],
            |row| RawUser::from_row(row, 0),
          )
          .optional()?;
        let Some(found) = found else {
          return Err(domain(Error::StudentNotFound(student_no)));
        };

        let course_exists: bool = tx
          .query_row(
            "SELECT 1 FROM courses WHERE course_id = ?1",
            rusqlite::params![course_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !course_exists {
          return Err(domain(Error::CourseNotFound(course_id)));
        }

        match tx.execute(
          "INSERT INTO enrollments (student_id, course_id) VALUES (?1, ?2)",
          rusqlite::params![found.user_id, course_str],
        ) {
          Ok(_) => {}
          Err(e) if is_unique_violation(&e) => {
            return Err(domain(Error::Duplicate(DuplicateKind::Enrollment)));
          }
          Err(e) => return Err(e.into()),
        }

        tx.commit()?;
        Ok(found)
      })
      .await
      .map_err(lift)?;

    raw.into_user()
  }

  async fn students_of(&self, course_id: Uuid) -> Result<Vec<User>> {
    let course_str = encode_uuid(course_id);

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT u.user_id, u.name, u.email, u.role,
                  u.student_no, u.programme, u.level
           FROM users u
           JOIN enrollments e ON e.student_id = u.user_id
           WHERE e.course_id = ?1
           ORDER BY u.name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![course_str], |row| {
            RawUser::from_row(row, 0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(lift)?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn courses_of(&self, student_id: Uuid) -> Result<Vec<Course>> {
    let student_str = encode_uuid(student_id);

    let raws: Vec<RawCourse> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT c.course_id, c.name, c.code, c.lecturer_id
           FROM courses c
           JOIN enrollments e ON e.course_id = c.course_id
           WHERE e.student_id = ?1
           ORDER BY c.name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![student_str], |row| {
            RawCourse::from_row(row, 0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(lift)?;

    raws.into_iter().map(RawCourse::into_course).collect()
  }

  // ── Session codes ─────────────────────────────────────────────────────────

  async fn issue_code(
    &self,
    course_id: Uuid,
    lecturer_id: Uuid,
  ) -> Result<SessionCode> {
    let issued = SessionCode {
      code_id:     Uuid::new_v4(),
      course_id,
      lecturer_id,
      code:        session::generate_code(),
      active:      true,
      created_at:  Utc::now(),
    };

    let code_id_str  = encode_uuid(issued.code_id);
    let course_str   = encode_uuid(course_id);
    let lecturer_str = encode_uuid(lecturer_id);
    let code         = issued.code.clone();
    let at_str       = encode_dt(issued.created_at);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let course_exists: bool = tx
          .query_row(
            "SELECT 1 FROM courses WHERE course_id = ?1",
            rusqlite::params![course_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !course_exists {
          return Err(domain(Error::CourseNotFound(course_id)));
        }

        // All rows, not just one: clears a somehow-duplicated active pair.
        tx.execute(
          "UPDATE session_codes SET active = 0
           WHERE course_id = ?1 AND active = 1",
          rusqlite::params![course_str],
        )?;
        tx.execute(
          "INSERT INTO session_codes (
             code_id, course_id, lecturer_id, code, active, created_at
           ) VALUES (?1, ?2, ?3, ?4, 1, ?5)",
          rusqlite::params![code_id_str, course_str, lecturer_str, code, at_str],
        )?;

        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(lift)?;

    Ok(issued)
  }

  async fn active_code(&self, course_id: Uuid) -> Result<Option<SessionCode>> {
    let course_str = encode_uuid(course_id);

    let raw: Option<RawCode> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT code_id, course_id, lecturer_id, code, active, created_at
               FROM session_codes WHERE course_id = ?1 AND active = 1",
              rusqlite::params![course_str],
              |row| RawCode::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await
      .map_err(lift)?;

    raw.map(RawCode::into_code).transpose()
  }

  async fn deactivate_code(&self, course_id: Uuid) -> Result<()> {
    let course_str = encode_uuid(course_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE session_codes SET active = 0
           WHERE course_id = ?1 AND active = 1",
          rusqlite::params![course_str],
        )?;
        Ok(())
      })
      .await
      .map_err(lift)
  }

  // ── Attendance ────────────────────────────────────────────────────────────

  async fn mark(
    &self,
    student_id: Uuid,
    course_id: Uuid,
    presented_code: &str,
    today: NaiveDate,
  ) -> Result<AttendanceRecord> {
    let record = AttendanceRecord {
      record_id:   Uuid::new_v4(),
      student_id,
      course_id,
      date:        today,
      status:      AttendanceStatus::Present,
      recorded_at: Utc::now(),
    };

    let record_str  = encode_uuid(record.record_id);
    let student_str = encode_uuid(student_id);
    let course_str  = encode_uuid(course_id);
    let date_str    = encode_date(today);
    let status_str  = encode_status(record.status).to_owned();
    let at_str      = encode_dt(record.recorded_at);
    let presented   = presented_code.to_owned();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let active: Option<String> = tx
          .query_row(
            "SELECT code FROM session_codes
             WHERE course_id = ?1 AND active = 1",
            rusqlite::params![course_str],
            |row| row.get(0),
          )
          .optional()?;
        let Some(active) = active else {
          return Err(domain(Error::NoActiveSession));
        };
        if !session::code_matches(&active, &presented) {
          return Err(domain(Error::InvalidCode));
        }

        // The unique index is the duplicate check; no read-before-write.
        match tx.execute(
          "INSERT INTO attendance (
             record_id, student_id, course_id, date, status, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            record_str,
            student_str,
            course_str,
            date_str,
            status_str,
            at_str,
          ],
        ) {
          Ok(_) => {}
          Err(e) if is_unique_violation(&e) => {
            return Err(domain(Error::AlreadyMarked));
          }
          Err(e) => return Err(e.into()),
        }

        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(lift)?;

    Ok(record)
  }

  async fn history_for(&self, student_id: Uuid) -> Result<Vec<AttendanceEntry>> {
    let student_str = encode_uuid(student_id);

    let raws: Vec<(RawRecord, RawCourse)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT a.record_id, a.student_id, a.course_id, a.date, a.status,
                  a.recorded_at,
                  c.course_id, c.name, c.code, c.lecturer_id
           FROM attendance a
           JOIN courses c ON c.course_id = a.course_id
           WHERE a.student_id = ?1
           ORDER BY a.date DESC, a.record_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![student_str], |row| {
            Ok((RawRecord::from_row(row, 0)?, RawCourse::from_row(row, 6)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(lift)?;

    raws
      .into_iter()
      .map(|(record, course)| {
        Ok(AttendanceEntry {
          record: record.into_record()?,
          course: course.into_course()?,
        })
      })
      .collect()
  }

  async fn records_for_course(
    &self,
    course_id: Uuid,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
  ) -> Result<Vec<CourseAttendee>> {
    let course_str = encode_uuid(course_id);
    // Fixed-width dates make lexicographic bounds valid, so open ends are
    // just extreme sentinels.
    let from_str = from.map(encode_date).unwrap_or_else(|| "0000-01-01".into());
    let to_str   = to.map(encode_date).unwrap_or_else(|| "9999-12-31".into());

    let raws: Vec<(RawRecord, RawUser)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT a.record_id, a.student_id, a.course_id, a.date, a.status,
                  a.recorded_at,
                  u.user_id, u.name, u.email, u.role,
                  u.student_no, u.programme, u.level
           FROM attendance a
           JOIN users u ON u.user_id = a.student_id
           WHERE a.course_id = ?1 AND a.date >= ?2 AND a.date <= ?3
           ORDER BY a.date, a.record_id",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![course_str, from_str, to_str],
            |row| {
              Ok((RawRecord::from_row(row, 0)?, RawUser::from_row(row, 6)?))
            },
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(lift)?;

    raws
      .into_iter()
      .map(|(record, student)| {
        Ok(CourseAttendee {
          record:  record.into_record()?,
          student: student.into_user()?,
        })
      })
      .collect()
  }

  // ── Stats ─────────────────────────────────────────────────────────────────

  async fn stats_for(&self, course_id: Uuid) -> Result<CourseStats> {
    let course_str = encode_uuid(course_id);

    let (sessions, attendances, enrolled): (u64, u64, u64) = self
      .conn
      .call(move |conn| {
        let (sessions, attendances) = conn.query_row(
          "SELECT COUNT(DISTINCT date), COUNT(*)
           FROM attendance WHERE course_id = ?1",
          rusqlite::params![course_str],
          |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let enrolled = conn.query_row(
          "SELECT COUNT(*) FROM enrollments WHERE course_id = ?1",
          rusqlite::params![course_str],
          |row| row.get(0),
        )?;
        Ok((sessions, attendances, enrolled))
      })
      .await
      .map_err(lift)?;

    Ok(CourseStats::from_counts(sessions, attendances, enrolled))
  }
}
