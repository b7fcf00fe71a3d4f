use eyre::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::{Connection, OpenFlags, backup::Backup};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

/// Everything the conversion pipeline needs to run.
/// This decouples the logic from how the arguments were gathered (CLI/config file).
#[derive(Clone)]
pub struct ConvertConfig {
    pub vault: PathBuf,
    pub db_path: PathBuf,
    pub media: MediaSources,
    pub include_instagram: bool,
    pub dry_run: bool,
    pub verbose: bool,
    pub quiet: bool,
}

/// The three Day One media directories searched when an attachment hash is
/// materialized.
#[derive(Clone)]
pub struct MediaSources {
    pub photos: PathBuf,
    pub videos: PathBuf,
    pub audios: PathBuf,
}

/// Day One's group container under the user's home directory.
fn dayone_container() -> Option<PathBuf> {
    dirs::home_dir()
        .map(|h| h.join("Library/Group Containers/5U8NS4GX82.dayoneapp2/Data/Documents"))
}

pub fn default_db_path() -> Option<PathBuf> {
    dayone_container().map(|d| d.join("DayOne.sqlite"))
}

impl MediaSources {
    /// Apply config-file overrides on top of the default container layout.
    pub fn resolve(
        photos: Option<PathBuf>,
        videos: Option<PathBuf>,
        audios: Option<PathBuf>,
    ) -> Self {
        let container = dayone_container().unwrap_or_else(|| PathBuf::from("."));
        Self {
            photos: photos.unwrap_or_else(|| container.join("DayOnePhotos")),
            videos: videos.unwrap_or_else(|| container.join("DayOneVideos")),
            audios: audios.unwrap_or_else(|| container.join("DayOneAudios")),
        }
    }

    /// Probe order: photos, then videos, then audios.
    pub fn in_order(&self) -> [&Path; 3] {
        [&self.photos, &self.videos, &self.audios]
    }
}

/// Outcome of merging one day's content into its daily note.
#[derive(Clone, Copy)]
pub enum ProcessResult {
    Created,
    Updated,
    Skipped,
}

/// Copy the Day One store to a temporary file with the online-backup API.
/// The app may hold the live database open; reading a snapshot avoids busy
/// locks without ever writing to the source.
pub fn snapshot_database(db_path: &Path, quiet: bool) -> Result<NamedTempFile> {
    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        let s = ProgressBar::new_spinner();
        s.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        s.set_message("Snapshotting Day One database...");
        s.enable_steady_tick(Duration::from_millis(80));
        s
    };

    let src = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .wrap_err_with(|| format!("Failed to open source database: {}", db_path.display()))?;

    let tmp = NamedTempFile::new().wrap_err("Failed to create temporary file")?;
    let mut dst =
        Connection::open(tmp.path()).wrap_err("Failed to open snapshot database connection")?;

    {
        let backup = Backup::new(&src, &mut dst).wrap_err("Failed to initialize backup")?;
        backup
            .run_to_completion(1000, Duration::from_millis(5), None)
            .wrap_err("Backup did not complete successfully")?;
    }

    drop(src);
    spinner.finish_and_clear();
    Ok(tmp)
}
