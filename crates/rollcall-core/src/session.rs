//! Session codes — the short-lived, per-course credential that gates
//! attendance redemption.
//!
//! A code is five characters drawn uniformly from a 32-symbol alphabet with
//! the visually ambiguous `0`/`O` and `1`/`I` removed, so a code read off a
//! projector survives being typed back in. Collisions across courses or
//! across time are accepted: validation is always scoped to the single
//! currently-active code of one course, so global uniqueness buys nothing.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The 32 permitted code symbols.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of every generated code.
pub const CODE_LEN: usize = 5;

/// One issued code. Codes are never deleted; issuing a successor flips
/// `active` off on the predecessor, leaving an append-only history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCode {
  pub code_id:     Uuid,
  pub course_id:   Uuid,
  /// The lecturer who issued this code.
  pub lecturer_id: Uuid,
  pub code:        String,
  pub active:      bool,
  pub created_at:  DateTime<Utc>,
}

impl SessionCode {
  /// Case-insensitive comparison against a student-presented code.
  pub fn matches(&self, presented: &str) -> bool {
    code_matches(&self.code, presented)
  }
}

/// Case-insensitive comparison of a stored code against presented input.
///
/// Callers are expected to upper-case input already; the engine re-normalises
/// anyway.
pub fn code_matches(stored: &str, presented: &str) -> bool {
  stored.eq_ignore_ascii_case(presented.trim())
}

/// Generate a fresh code, each character chosen uniformly at random.
pub fn generate_code() -> String {
  generate_code_with(&mut rand::thread_rng())
}

/// Deterministic variant for callers that supply their own RNG.
pub fn generate_code_with<R: Rng>(rng: &mut R) -> String {
  (0..CODE_LEN)
    .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
    .collect()
}
