//! The conversion pipeline: snapshot, read, group, render, merge, report.
//!
//! Runs in two phases. The read phase walks every entry in creation order,
//! resolves its metadata and media, and groups the prepared entries by
//! calendar day. The merge phase then renders each day and merges it into
//! the matching daily note. Media files are copied during the read phase as
//! moment links resolve.

use crate::normalize;
use crate::render::{self, PreparedEntry};
use crate::store;
use crate::utils::{ConvertConfig, ProcessResult, snapshot_database};
use crate::vault::{self, VaultLayout};
use chrono::NaiveDate;
use eyre::{Context, Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use std::collections::{BTreeMap, HashMap};

/// Journal whose entries are auto-imported posts, not writing. Excluded
/// unless `--include-instagram` is given.
pub const INSTAGRAM_JOURNAL: &str = "Instagram";

/// Counters for one conversion run.
#[derive(Debug, Default, Clone, Copy)]
pub struct Report {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub skipped_instagram: usize,
    pub skipped_empty: usize,
    pub assets: usize,
}

/// Run a full conversion against the configured vault and database.
pub fn execute(config: &ConvertConfig) -> Result<Report> {
    let layout = VaultLayout::new(&config.vault);
    if !layout.daily.exists() {
        return Err(eyre!("Daily folder not found: {}", layout.daily.display()));
    }

    let snapshot = snapshot_database(&config.db_path, config.quiet)?;
    let conn = store::open_readonly(snapshot.path())?;
    let journals = store::journal_names(&conn)?;

    if !config.quiet {
        let mut named: Vec<_> = journals.iter().collect();
        named.sort_by_key(|(pk, _)| **pk);
        let names: Vec<&str> = named.iter().map(|(_, name)| name.as_str()).collect();
        eprintln!("Found journals: {}", names.join(", "));
        eprintln!("Vault: {}", layout.root.display());
        eprintln!("Daily notes: {}", layout.daily.display());
        eprintln!("Assets: {}", layout.assets.display());
        eprintln!();
    }

    let mut report = Report::default();
    let days = collect_days(&conn, &journals, config, &layout, &mut report)?;
    drop(conn);

    if !config.quiet {
        eprintln!("Processing {} dates...", days.len());
    }
    let pb = if config.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(days.len() as u64)
    };
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)",
        )
        .unwrap()
        .progress_chars("=>-"),
    );

    for (date, entries) in &days {
        let note = format!("{}.md", date.format("%Y%m%d"));
        match merge_day(&layout, *date, entries)? {
            ProcessResult::Created => {
                report.created += 1;
                if config.verbose {
                    pb.println(format!("  Created: {note}"));
                }
            }
            ProcessResult::Updated => {
                report.updated += 1;
                if config.verbose {
                    pb.println(format!("  Updated: {note}"));
                }
            }
            ProcessResult::Skipped => {
                report.skipped += 1;
                if config.verbose {
                    pb.println(format!("  Skipping {note} - Day One content already present"));
                }
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    report.assets = layout.asset_count();
    if !config.quiet {
        print_summary(config, &report);
    }
    Ok(report)
}

/// Read every entry and bucket the renderable ones by calendar day.
///
/// Metadata lookups that fail are flattened to empty values here so a
/// damaged tag or location row never loses the entry text.
fn collect_days(
    conn: &Connection,
    journals: &HashMap<i64, String>,
    config: &ConvertConfig,
    layout: &VaultLayout,
    report: &mut Report,
) -> Result<BTreeMap<NaiveDate, Vec<PreparedEntry>>> {
    let mut stmt = conn
        .prepare(store::ENTRY_QUERY)
        .wrap_err("Failed to prepare entry query")?;
    let rows = stmt
        .query_map([], store::entry_from_row)
        .wrap_err("Failed to query entries")?;

    let mut days: BTreeMap<NaiveDate, Vec<PreparedEntry>> = BTreeMap::new();
    for row in rows {
        let row = row.wrap_err("Failed to read entry row")?;
        let journal = row
            .journal
            .and_then(|pk| journals.get(&pk))
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string());

        if journal == INSTAGRAM_JOURNAL && !config.include_instagram {
            report.skipped_instagram += 1;
            continue;
        }

        let text = row.text.clone().unwrap_or_default();
        if text.trim().is_empty() {
            report.skipped_empty += 1;
            continue;
        }

        // Neither calendar fields nor a timestamp. Nothing to file it under.
        let Some(date) = row.date() else {
            continue;
        };

        let tags = store::tags_for_entry(conn, row.pk).unwrap_or_default();
        let location = store::location_for_entry(conn, row.location).unwrap_or_default();
        let weather = store::weather_for_entry(conn, row.weather).unwrap_or_default();
        let attachments = store::attachments_for_entry(conn, row.pk).unwrap_or_default();

        let text = normalize::rewrite_entry_text(
            &text,
            &attachments,
            &config.media,
            &layout.assets,
            vault::ASSETS_FOLDER,
        )?;

        days.entry(date).or_default().push(PreparedEntry {
            text,
            tags,
            location,
            weather,
            journal,
        });
    }
    Ok(days)
}

/// Render one day and merge it into its daily note.
fn merge_day(
    layout: &VaultLayout,
    date: NaiveDate,
    entries: &[PreparedEntry],
) -> Result<ProcessResult> {
    let content = render::day_content(entries);
    let path = layout.daily_note_path(date);
    let existed = path.exists();
    let wrote = vault::merge_day_note(&path, date, &content)?;
    Ok(match (wrote, existed) {
        (true, false) => ProcessResult::Created,
        (true, true) => ProcessResult::Updated,
        (false, _) => ProcessResult::Skipped,
    })
}

fn print_summary(config: &ConvertConfig, report: &Report) {
    eprintln!();
    eprintln!("{}", "=".repeat(50));
    eprintln!("Conversion complete!");
    eprintln!("  Daily notes created: {}", report.created);
    eprintln!("  Daily notes updated: {}", report.updated);
    eprintln!(
        "  Daily notes skipped (already had DayOne): {}",
        report.skipped
    );
    eprintln!("  Instagram entries skipped: {}", report.skipped_instagram);
    eprintln!("  Empty entries skipped: {}", report.skipped_empty);
    eprintln!("  Photos/videos copied to assets: {}", report.assets);
    eprintln!();
    if !config.include_instagram && report.skipped_instagram > 0 {
        eprintln!(
            "  (Run with --include-instagram to include {} Instagram entries)",
            report.skipped_instagram
        );
    }
}
