//! # dayone-daily-export
//!
//! A CLI tool that merges [Day One](https://dayoneapp.com) journal entries into
//! Obsidian daily notes.
//!
//! ## What it does
//!
//! Day One keeps its journals in a Core Data SQLite store (`DayOne.sqlite`),
//! with photos, videos and audio recordings stored alongside, named by content
//! hash. This tool reads that store, groups entries by calendar date, renders
//! each entry as a markdown block (journal label, location, weather, tags,
//! body), and merges the blocks into the matching `00 Daily/YYYY/YYYYMMDD.md`
//! note under a `## Day One Journal` section. Referenced media files are
//! copied into `06 Assets/DayOne/` and embedded with wiki links.
//!
//! The database is opened **read-only**; your journals are never modified.
//!
//! ## Re-runs
//!
//! Merging is idempotent: a daily note that already contains the
//! `## Day One Journal` section is left untouched and counted as skipped, so
//! the tool can be re-run safely after a partial import.
//!
//! ## Usage
//!
//! ```sh
//! # Merge everything into a vault
//! dayone-daily-export ~/Documents/MyVault
//!
//! # Include the Instagram journal and point at a copied database
//! dayone-daily-export ~/Documents/MyVault --include-instagram --db ./DayOne.sqlite
//! ```
//!
//! The database path and the media source directories can be persisted in
//! `~/.config/dayone-daily-export/config.toml`.
//!
//! ## Compatibility
//!
//! Tracks Day One's internal (undocumented) Core Data schema on macOS. The
//! vault must already contain a `00 Daily` folder; the tool refuses to run
//! otherwise rather than invent a layout.
