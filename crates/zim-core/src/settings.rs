use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OptionalExtension};

use crate::space_travel::overlay::DEFAULT_GUIDE_OFFSET;

/// Editor settings that shape the travel overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorSettings {
    /// Font size in points.
    pub font_size: f64,
    /// `0` derives from the font size, below `8` is a multiplier, otherwise
    /// pixels.
    pub line_height: f64,
    pub char_width: f64,
    /// Vertical nudge of the horizontal guide, in pixels.
    pub guide_offset: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            line_height: 0.0,
            char_width: 1.0,
            guide_offset: DEFAULT_GUIDE_OFFSET,
        }
    }
}

impl EditorSettings {
    pub const KEYS: [&'static str; 4] = ["font_size", "line_height", "char_width", "guide_offset"];

    pub fn get(&self, key: &str) -> Option<f64> {
        match key {
            "font_size" => Some(self.font_size),
            "line_height" => Some(self.line_height),
            "char_width" => Some(self.char_width),
            "guide_offset" => Some(self.guide_offset),
            _ => None,
        }
    }

    /// Set one value from user input, validating it first.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parsed: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("Invalid number for {key}: {value:?}"))?;
        if !parsed.is_finite() {
            bail!("{key} must be a finite number");
        }
        match key {
            "font_size" if parsed <= 0.0 => bail!("font_size must be positive"),
            "font_size" => self.font_size = parsed,
            "line_height" if parsed < 0.0 => bail!("line_height can't be negative"),
            "line_height" => self.line_height = parsed,
            "char_width" if parsed <= 0.0 => bail!("char_width must be positive"),
            "char_width" => self.char_width = parsed,
            "guide_offset" => self.guide_offset = parsed,
            _ => bail!("Unknown setting: {key}"),
        }
        Ok(())
    }

    /// Parse and apply a `key=value` assignment.
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment
            .split_once('=')
            .with_context(|| format!("Expected key=value, got {assignment:?}"))?;
        self.set(key.trim(), value)
    }

    /// One-line summary for the status bar.
    pub fn summary(&self) -> String {
        Self::KEYS
            .iter()
            .filter_map(|k| self.get(k).map(|v| format!("{k}={v}")))
            .collect::<Vec<_>>()
            .join("  ")
    }
}

/// Initialize the settings table.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value REAL NOT NULL
        );",
    )?;
    Ok(())
}

/// Load settings, falling back to defaults for missing keys.
pub fn load(conn: &Connection) -> Result<EditorSettings> {
    let mut settings = EditorSettings::default();
    let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
    for key in EditorSettings::KEYS {
        let stored: Option<f64> = stmt
            .query_row([key], |row| row.get(0))
            .optional()
            .with_context(|| format!("Failed to read setting {key}"))?;
        if let Some(value) = stored {
            if let Err(err) = settings.set(key, &value.to_string()) {
                tracing::warn!(key, value, "ignoring stored setting: {err:#}");
            }
        }
    }
    Ok(settings)
}

/// Persist all settings.
pub fn save(conn: &Connection, settings: &EditorSettings) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )?;
    for key in EditorSettings::KEYS {
        if let Some(value) = settings.get(key) {
            stmt.execute(rusqlite::params![key, value])
                .with_context(|| format!("Failed to save setting {key}"))?;
        }
    }
    Ok(())
}
