//! Course — immutable after creation within the engine's scope.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A taught course, owned by the lecturer who created it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
  pub course_id:   Uuid,
  pub name:        String,
  /// Catalogue code, e.g. `GRD301`. Not to be confused with session codes.
  pub code:        String,
  pub lecturer_id: Uuid,
}

/// Input to [`crate::store::AttendanceStore::create_course`].
/// The opaque id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewCourse {
  pub name:        String,
  pub code:        String,
  pub lecturer_id: Uuid,
}
