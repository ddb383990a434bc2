//! SQL schema for the Akita SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Parent references are deliberately not foreign keys: an ancestor may be
-- referenced before (or without) being recorded, and readers treat a dangling
-- reference as an unknown ancestor.
CREATE TABLE IF NOT EXISTS animals (
    id                  TEXT PRIMARY KEY,
    registered_name     TEXT NOT NULL UNIQUE,
    call_name           TEXT NOT NULL,
    gender              TEXT NOT NULL,   -- 'male' | 'female'
    sire_id             TEXT,
    dam_id              TEXT,
    titles              TEXT NOT NULL DEFAULT '[]',
    owner_id            TEXT NOT NULL,
    registration_number TEXT,
    color               TEXT,
    date_of_birth       TEXT,            -- ISO 8601 calendar date
    origin              TEXT NOT NULL DEFAULT 'direct',
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS animals_sire_idx  ON animals(sire_id);
CREATE INDEX IF NOT EXISTS animals_dam_idx   ON animals(dam_id);
CREATE INDEX IF NOT EXISTS animals_owner_idx ON animals(owner_id);

PRAGMA user_version = 1;
";
