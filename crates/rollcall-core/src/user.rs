//! User — students and lecturers share one identity record.
//!
//! A user's opaque id is distinct from a student's human-facing `student_no`
//! (the identifier printed on their card, e.g. `BC/GRD/22/118`). Enrollment
//! lookups go through `student_no`; every other relation uses the opaque id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role a user registered under. One email may hold one account per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Student,
  Lecturer,
}

/// Fields present only on student accounts.
///
/// `programme` is the programme of study ("Graphic Design"), not a course in
/// the registry sense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
  pub student_no: String,
  pub programme:  String,
  pub level:      String,
}

/// A registered user. The password hash never travels on this type; callers
/// that need it go through [`crate::store::AttendanceStore::credential`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id: Uuid,
  pub name:    String,
  pub email:   String,
  pub role:    Role,
  /// Present iff `role` is [`Role::Student`]. Flattened, so the profile
  /// fields sit beside the identity fields on the wire; `None` emits nothing.
  #[serde(flatten)]
  pub student: Option<StudentProfile>,
}

// ─── NewUser ─────────────────────────────────────────────────────────────────

/// Role-specific registration payload. A student registration without a
/// profile is unrepresentable; the caller resolves missing fields into a
/// validation failure before this type exists.
#[derive(Debug, Clone)]
pub enum NewUserKind {
  Student(StudentProfile),
  Lecturer,
}

/// Input to [`crate::store::AttendanceStore::register_user`].
/// The opaque id is assigned by the store; `password_hash` is an argon2 PHC
/// string produced by the caller — the store never sees a plaintext password.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub name:          String,
  pub email:         String,
  pub password_hash: String,
  pub kind:          NewUserKind,
}

impl NewUser {
  pub fn role(&self) -> Role {
    match self.kind {
      NewUserKind::Student(_) => Role::Student,
      NewUserKind::Lecturer => Role::Lecturer,
    }
  }

  pub fn profile(&self) -> Option<&StudentProfile> {
    match &self.kind {
      NewUserKind::Student(p) => Some(p),
      NewUserKind::Lecturer => None,
    }
  }
}

/// A user together with their stored password hash, for login verification.
#[derive(Debug, Clone)]
pub struct Credential {
  pub user:          User,
  pub password_hash: String,
}
