//! Handlers for registration and login.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users` | Register; students must send `student_no`, `programme`, `level` |
//! | `POST` | `/login` | Verify email + password + role; returns the profile |
//!
//! Passwords are hashed here with argon2 before they reach the store; the
//! store never sees plaintext.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use rand_core::OsRng;
use rollcall_core::{
  Error as DomainError,
  store::AttendanceStore,
  user::{NewUser, NewUserKind, Role, StudentProfile, User},
};
use serde::Deserialize;

use crate::error::ApiError;

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub name:       String,
  pub email:      String,
  pub password:   String,
  pub role:       Role,
  pub student_no: Option<String>,
  pub programme:  Option<String>,
  pub level:      Option<String>,
}

/// `POST /users`
pub async fn register<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AttendanceStore,
{
  let kind = match body.role {
    Role::Student => {
      let (Some(student_no), Some(programme), Some(level)) =
        (body.student_no, body.programme, body.level)
      else {
        return Err(
          DomainError::Validation(
            "student_no, programme, and level are required for students"
              .to_string(),
          )
          .into(),
        );
      };
      NewUserKind::Student(StudentProfile { student_no, programme, level })
    }
    Role::Lecturer => NewUserKind::Lecturer,
  };

  let user = store
    .register_user(NewUser {
      name:          body.name,
      email:         body.email,
      password_hash: hash_password(&body.password)?,
      kind,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
  pub role:     Role,
}

/// `POST /login` — returns the user profile on success. The failure message
/// does not reveal whether the email or the password was wrong.
pub async fn login<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<User>, ApiError>
where
  S: AttendanceStore,
{
  let cred = store
    .credential(&body.email, body.role)
    .await?
    .ok_or(ApiError::Unauthorized)?;

  let parsed_hash =
    PasswordHash::new(&cred.password_hash).map_err(|_| ApiError::Unauthorized)?;
  Argon2::default()
    .verify_password(body.password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(Json(cred.user))
}

// ─── Hashing ──────────────────────────────────────────────────────────────────

/// Produce the argon2 PHC string stored in place of the password.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|_| ApiError::Hashing)?
      .to_string(),
  )
}
