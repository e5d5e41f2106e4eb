//! Database schema and migrations for StudySync.
//!
//! Migrations are applied in order when the database is opened; the
//! `schema_version` table records which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: accounts and the four document categories
    r#"
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE,
    password    TEXT NOT NULL,           -- Argon2 PHC string
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

-- email is checked against users in the upload workflow, not by a foreign key
CREATE TABLE uploads (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    email       TEXT NOT NULL,
    sem         TEXT NOT NULL,
    subject     TEXT NOT NULL,
    unit        TEXT NOT NULL,
    file        TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE assignments (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    subject     TEXT NOT NULL,
    unit        TEXT NOT NULL,
    file        TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE notes (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    subject     TEXT NOT NULL,
    unit        TEXT NOT NULL,
    file        TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE qpapers (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    subject     TEXT NOT NULL,
    exam_name   TEXT NOT NULL,
    year        TEXT NOT NULL,
    file        TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_uploads_subject ON uploads(subject);
CREATE INDEX idx_assignments_subject ON assignments(subject);
CREATE INDEX idx_notes_subject ON notes(subject);
CREATE INDEX idx_qpapers_subject ON qpapers(subject);
"#,
    // v2: write-ahead markers for blobs whose metadata is not committed yet
    r#"
CREATE TABLE pending_blobs (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    category    TEXT NOT NULL,
    filename    TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_pending_blobs_created_at ON pending_blobs(created_at);
CREATE INDEX idx_uploads_file ON uploads(file);
CREATE INDEX idx_assignments_file ON assignments(file);
CREATE INDEX idx_notes_file ON notes(file);
CREATE INDEX idx_qpapers_file ON qpapers(file);
"#,
];
