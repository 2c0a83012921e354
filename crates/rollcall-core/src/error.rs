//! Error types for `rollcall-core`.
//!
//! Every expected domain condition is a variant here, returned as a value.
//! Nothing in the engine panics or aborts for a condition a caller can
//! reasonably trigger.

use thiserror::Error;
use uuid::Uuid;

/// Which uniqueness constraint a duplicate write collided with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateKind {
  /// A user with the same (email, role) pair already exists.
  EmailRole,
  /// The human-facing student identifier is already registered.
  StudentNo,
  /// The (student, course) enrollment pair already exists.
  Enrollment,
}

impl std::fmt::Display for DuplicateKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let msg = match self {
      Self::EmailRole => "an account with this email already exists",
      Self::StudentNo => "this student identifier is already registered",
      Self::Enrollment => "student is already enrolled in this course",
    };
    f.write_str(msg)
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("no student with identifier {0:?}")]
  StudentNotFound(String),

  #[error("course not found: {0}")]
  CourseNotFound(Uuid),

  #[error("{0}")]
  Duplicate(DuplicateKind),

  #[error("no active attendance session for this course")]
  NoActiveSession,

  #[error("invalid attendance code")]
  InvalidCode,

  #[error("attendance already marked for today")]
  AlreadyMarked,

  #[error("validation error: {0}")]
  Validation(String),

  #[error("storage error: {0}")]
  Storage(String),
}

impl Error {
  /// Wrap a backend failure that has no domain meaning.
  pub fn storage(e: impl std::fmt::Display) -> Self {
    Self::Storage(e.to_string())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
