use anyhow::{Context, Result};
use directories::ProjectDirs;
use rusqlite::Connection;
use std::path::PathBuf;

/// Returns the zim data directory, creating it if needed.
/// Location: `~/.local/share/zim` (XDG-compliant)
pub fn data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "zim").context("Could not determine data directory")?;
    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.to_path_buf())
}

/// Returns the path to the zim database.
pub fn db_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("zim.db"))
}

/// Opens (or creates) the database, with every table zim uses.
/// Enables WAL mode so a second zim instance can read settings concurrently.
pub fn open_db() -> Result<Connection> {
    let path = db_path()?;
    let conn = Connection::open(&path)
        .with_context(|| format!("Failed to open database at {}", path.display()))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    crate::settings::init_db(&conn)?;

    Ok(conn)
}

/// Open an in-memory database, for tests and `--no-db` runs.
pub fn open_memory_db() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    crate::settings::init_db(&conn)?;
    Ok(conn)
}
