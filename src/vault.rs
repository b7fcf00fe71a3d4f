//! Obsidian vault layout and the daily-note merge rule.
//!
//! Daily notes live at `00 Daily/<year>/<YYYYMMDD>.md` under the vault root.
//! Merging is marker-based: a note containing the `## Day One Journal`
//! heading is considered done and is never rewritten, which is what makes
//! repeated runs safe.

use chrono::NaiveDate;
use eyre::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Daily-notes folder under the vault root. Must already exist; a vault
/// without it is treated as the wrong vault.
pub const DAILY_FOLDER: &str = "00 Daily";

/// Asset folder under the vault root, also used verbatim inside `![[...]]`
/// embeds. Created on demand.
pub const ASSETS_FOLDER: &str = "06 Assets/DayOne";

/// Heading that marks a note as already merged.
pub const SECTION_MARKER: &str = "## Day One Journal";

/// Resolved locations inside one vault.
#[derive(Debug, Clone)]
pub struct VaultLayout {
    pub root: PathBuf,
    pub daily: PathBuf,
    pub assets: PathBuf,
}

impl VaultLayout {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            daily: root.join(DAILY_FOLDER),
            assets: root.join(ASSETS_FOLDER),
        }
    }

    /// `00 Daily/<year>/<YYYYMMDD>.md` for a given day.
    pub fn daily_note_path(&self, date: NaiveDate) -> PathBuf {
        self.daily
            .join(date.format("%Y").to_string())
            .join(format!("{}.md", date.format("%Y%m%d")))
    }

    /// Direct children of the asset folder, zero when it was never created.
    pub fn asset_count(&self) -> usize {
        match fs::read_dir(&self.assets) {
            Ok(entries) => entries.filter_map(|entry| entry.ok()).count(),
            Err(_) => 0,
        }
    }
}

/// Merge a day's rendered section into its daily note.
///
/// Returns `Ok(false)` without touching the file when the note already
/// holds the section marker. An existing note gets the section appended
/// after a horizontal rule; a missing note is created with frontmatter and
/// a day heading above the section.
pub fn merge_day_note(path: &Path, date: NaiveDate, content: &str) -> Result<bool> {
    let existing = match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(err) => {
            return Err(err).wrap_err_with(|| format!("Failed to read {}", path.display()));
        }
    };

    if let Some(text) = &existing
        && text.contains(SECTION_MARKER)
    {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
    }

    match existing {
        Some(_) => {
            let mut file = OpenOptions::new()
                .append(true)
                .open(path)
                .wrap_err_with(|| format!("Failed to open {} for append", path.display()))?;
            write!(file, "\n\n---\n\n{SECTION_MARKER}\n\n{content}")
                .wrap_err_with(|| format!("Failed to append to {}", path.display()))?;
        }
        None => {
            let weekday = date.format("%A").to_string();
            let date_str = date.format("%Y-%m-%d").to_string();
            let month_day = date.format("%B %d, %Y").to_string();
            let note = format!(
                "---\n\
                 date: {date_str}\n\
                 tags: [Daily, DayOne]\n\
                 cssclasses: [daily, {weekday}]\n\
                 ---\n\n\
                 # {weekday}, {month_day}\n\n\
                 {SECTION_MARKER}\n\n\
                 {content}"
            );
            fs::write(path, note)
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        }
    }
    Ok(true)
}
