//! SQLite storage for guides.
//!
//! The schema is created once at startup by [`init`]; request handlers then
//! open their own short-lived connection with [`open`]. Deleting a property
//! or section cascades to its children.

pub mod gateway;

use std::path::Path;
use std::time::Duration;

use log::info;
use rusqlite::Connection;

pub use gateway::SqliteGateway;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS wt_properties (
    id              TEXT PRIMARY KEY,
    title           TEXT NOT NULL,
    slug            TEXT NOT NULL UNIQUE,
    welcome_message TEXT NOT NULL DEFAULT '',
    hero_image_url  TEXT NOT NULL DEFAULT '',
    owner_id        TEXT NOT NULL,
    created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE TABLE IF NOT EXISTS wt_sections (
    id            TEXT PRIMARY KEY,
    property_id   TEXT NOT NULL REFERENCES wt_properties(id) ON DELETE CASCADE,
    title         TEXT NOT NULL,
    icon_name     TEXT NOT NULL DEFAULT '',
    content       TEXT NOT NULL DEFAULT '',
    display_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS wt_images (
    id            TEXT PRIMARY KEY,
    section_id    TEXT NOT NULL REFERENCES wt_sections(id) ON DELETE CASCADE,
    image_url     TEXT NOT NULL,
    caption       TEXT NOT NULL DEFAULT '',
    display_order INTEGER NOT NULL DEFAULT 0,
    UNIQUE (section_id, image_url)
);

CREATE TABLE IF NOT EXISTS wt_local_favourites (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    property_id   TEXT NOT NULL REFERENCES wt_properties(id) ON DELETE CASCADE,
    name          TEXT NOT NULL,
    description   TEXT NOT NULL DEFAULT '',
    url           TEXT,
    latitude      REAL,
    longitude     REAL,
    category      TEXT,
    display_order INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS wt_sections_property ON wt_sections(property_id, display_order);
CREATE INDEX IF NOT EXISTS wt_favourites_property ON wt_local_favourites(property_id, display_order);
";

/// Creates the database file and schema if missing.
pub fn init(path: &Path) -> rusqlite::Result<()> {
    let conn = open(path)?;
    conn.execute_batch(SCHEMA)?;
    info!("database ready at {}", path.display());
    Ok(())
}

/// Opens a connection for one request.
pub fn open(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    configure(&conn)?;
    Ok(conn)
}

#[cfg(test)]
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}

fn configure(conn: &Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}
