//! SQL schema for the rollcall SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL,
    password_hash TEXT NOT NULL,   -- argon2 PHC string; hashed by the caller
    role          TEXT NOT NULL,   -- 'student' | 'lecturer'
    student_no    TEXT,            -- students only: human-facing identifier
    programme     TEXT,
    level         TEXT,
    UNIQUE (email, role)
);

-- One student identifier per student; lecturers have NULL and are exempt.
CREATE UNIQUE INDEX IF NOT EXISTS users_student_no_idx
    ON users(student_no) WHERE student_no IS NOT NULL;

CREATE TABLE IF NOT EXISTS courses (
    course_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    code        TEXT NOT NULL,
    lecturer_id TEXT NOT NULL REFERENCES users(user_id)
);

-- Existence-only relation; the pair is the identity.
CREATE TABLE IF NOT EXISTS enrollments (
    student_id TEXT NOT NULL REFERENCES users(user_id),
    course_id  TEXT NOT NULL REFERENCES courses(course_id),
    PRIMARY KEY (student_id, course_id)
);

-- Codes are never deleted; issuing a successor flips active off.
CREATE TABLE IF NOT EXISTS session_codes (
    code_id     TEXT PRIMARY KEY,
    course_id   TEXT NOT NULL REFERENCES courses(course_id),
    lecturer_id TEXT NOT NULL REFERENCES users(user_id),
    code        TEXT NOT NULL,
    active      INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL    -- ISO 8601 UTC
);

-- At most one active code per course, enforced by the storage engine.
CREATE UNIQUE INDEX IF NOT EXISTS session_codes_active_idx
    ON session_codes(course_id) WHERE active = 1;

-- The ledger is strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS attendance (
    record_id   TEXT PRIMARY KEY,
    student_id  TEXT NOT NULL REFERENCES users(user_id),
    course_id   TEXT NOT NULL REFERENCES courses(course_id),
    date        TEXT NOT NULL,   -- fixed-width YYYY-MM-DD
    status      TEXT NOT NULL DEFAULT 'present',
    recorded_at TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    UNIQUE (student_id, course_id, date)
);

CREATE INDEX IF NOT EXISTS attendance_course_idx   ON attendance(course_id);
CREATE INDEX IF NOT EXISTS attendance_student_idx  ON attendance(student_id);
CREATE INDEX IF NOT EXISTS enrollments_course_idx  ON enrollments(course_id);
CREATE INDEX IF NOT EXISTS session_codes_course_idx ON session_codes(course_id);

PRAGMA user_version = 1;
";
