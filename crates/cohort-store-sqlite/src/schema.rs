//! SQL schema for the cohort SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS projects (
    project_id  INTEGER PRIMARY KEY,
    name        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sites (
    site_id  INTEGER PRIMARY KEY,
    name     TEXT NOT NULL,
    alias    TEXT NOT NULL    -- short code shown in listings
);

-- Candidate registry. The API only ever exposes rows with active = 'Y'.
-- project_id is deliberately unconstrained: the id-to-name mapping is an
-- external lookup and may not know every identifier stored here.
CREATE TABLE IF NOT EXISTS candidates (
    cand_id     INTEGER PRIMARY KEY,
    pscid       TEXT NOT NULL UNIQUE,
    site_id     INTEGER NOT NULL REFERENCES sites(site_id),
    project_id  INTEGER,
    dob         TEXT NOT NULL,   -- YYYY-MM-DD
    gender      TEXT NOT NULL,
    language    TEXT,
    active      TEXT NOT NULL DEFAULT 'Y',   -- 'Y' | 'N'
    test_date   TEXT NOT NULL    -- RFC 3339 UTC; last modification
);

CREATE INDEX IF NOT EXISTS candidates_active_idx ON candidates(active);
CREATE INDEX IF NOT EXISTS candidates_site_idx   ON candidates(site_id);

PRAGMA user_version = 1;
";
