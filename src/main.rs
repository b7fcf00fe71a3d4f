mod assets;
mod convert;
mod normalize;
mod render;
mod store;
mod utils;
mod vault;

use clap::Parser;
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::{ConvertConfig, MediaSources};

/// Merge Day One journal entries into Obsidian daily notes.
/// Entries land in `00 Daily/YYYY/YYYYMMDD.md`; media in `06 Assets/DayOne/`.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the Obsidian vault root.
    #[arg(value_name = "VAULT_PATH")]
    vault_path: PathBuf,

    /// Include Instagram journal entries (excluded by default).
    #[arg(long)]
    include_instagram: bool,

    /// Show what would be done without making changes.
    #[arg(long)]
    dry_run: bool,

    /// Path to the Day One SQLite store (DayOne.sqlite).
    /// Auto-detected if omitted.
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Path to a specific configuration file.
    /// Defaults to $XDG_CONFIG_HOME/dayone-daily-export/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print each daily note created, updated or skipped.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress progress output and the final summary.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Deserialize, Default)]
struct FileConfig {
    db_path: Option<PathBuf>,
    photos_dir: Option<PathBuf>,
    videos_dir: Option<PathBuf>,
    audios_dir: Option<PathBuf>,
}

fn load_file_config(explicit_path: Option<&Path>) -> Result<FileConfig> {
    let path = if let Some(p) = explicit_path {
        if !p.exists() {
            return Err(eyre!("Config file not found: {}", p.display()));
        }
        Some(p.to_path_buf())
    } else {
        // Search: XDG/OS config dir, then nothing
        dirs::config_dir()
            .map(|d| d.join("dayone-daily-export/config.toml"))
            .filter(|p| p.exists())
    };

    match path {
        None => Ok(FileConfig::default()),
        Some(p) => {
            let content = fs::read_to_string(&p)
                .wrap_err_with(|| format!("Failed to read config: {}", p.display()))?;
            toml::from_str(&content)
                .wrap_err_with(|| format!("Failed to parse config: {}", p.display()))
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load config file (CLI path > default path)
    let file_cfg = load_file_config(cli.config.as_deref())?;

    // 2. Resolve db_path (CLI > Config > Auto-detect)
    let db_path = cli
        .db
        .or(file_cfg.db_path)
        .or_else(utils::default_db_path)
        .ok_or_else(|| {
            eyre!("Could not determine the Day One database path.\nUse --db to specify it manually, or set db_path in config.toml.")
        })?;

    if !db_path.exists() {
        return Err(eyre!(
            "Day One database not found at: {}\nUse --db to specify the path manually.",
            db_path.display()
        ));
    }

    // 3. Resolve media source directories (Config > Default)
    let media = MediaSources::resolve(
        file_cfg.photos_dir,
        file_cfg.videos_dir,
        file_cfg.audios_dir,
    );

    // 4. Build the conversion config
    let config = ConvertConfig {
        vault: cli.vault_path,
        db_path,
        media,
        include_instagram: cli.include_instagram,
        dry_run: cli.dry_run,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    if config.dry_run && !config.quiet {
        println!("DRY RUN - No changes will be made\n");
    }

    // 5. Run the pipeline
    convert::execute(&config)?;
    Ok(())
}
