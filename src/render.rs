//! Markdown assembly for the merged `## Day One Journal` section.
//!
//! Each entry becomes a `### Day One Entry` block: heading, optional
//! one-line metadata summary, then the normalized text. A day with several
//! entries numbers the blocks and joins them with a horizontal rule.

use crate::store::{Location, Weather};

/// Day One's default journal. Its name is noise, so headings omit it.
pub const DEFAULT_JOURNAL: &str = "Journal";

/// Country never shown in the location summary. Everywhere else is travel.
pub const HOME_COUNTRY: &str = "Spain";

/// Everything needed to render one entry, resolved during the read phase.
#[derive(Debug, Clone)]
pub struct PreparedEntry {
    pub text: String,
    pub tags: Vec<String>,
    pub location: Option<Location>,
    pub weather: Option<Weather>,
    pub journal: String,
}

/// Render one entry's markdown block. `ordinal` is the 1-based position
/// within the day and only shows when the day holds more than one entry.
pub fn entry_block(entry: &PreparedEntry, ordinal: Option<usize>, total: usize) -> String {
    let mut lines = Vec::new();

    if total > 1 && let Some(n) = ordinal {
        lines.push(format!(
            "### Day One Entry {n}{}",
            journal_label(&entry.journal, false)
        ));
    } else {
        lines.push(format!(
            "### Day One Entry{}",
            journal_label(&entry.journal, true)
        ));
    }
    lines.push(String::new());

    if let Some(meta) = metadata_line(entry) {
        lines.push(meta);
        lines.push(String::new());
    }

    lines.push(entry.text.clone());
    lines.join("\n")
}

fn journal_label(journal: &str, italic: bool) -> String {
    if journal == DEFAULT_JOURNAL {
        String::new()
    } else if italic {
        format!(" *({journal})*")
    } else {
        format!(" ({journal})")
    }
}

/// Italicized summary of location, weather, and tags, or `None` when the
/// entry has none of the three. Location hinges on a locality and weather on
/// a conditions string; the remaining fields only decorate those.
fn metadata_line(entry: &PreparedEntry) -> Option<String> {
    let mut parts = Vec::new();

    if let Some(location) = &entry.location
        && let Some(locality) = non_empty(&location.locality)
    {
        let mut segment = locality.to_string();
        if let Some(country) = non_empty(&location.country)
            && country != HOME_COUNTRY
        {
            segment.push_str(", ");
            segment.push_str(country);
        }
        parts.push(format!("📍 {segment}"));
    }

    if let Some(weather) = &entry.weather
        && let Some(conditions) = non_empty(&weather.conditions)
    {
        let mut segment = conditions.to_string();
        if let Some(temp) = weather.temperature {
            segment.push_str(&format!(" {}°C", temp as i64));
        }
        parts.push(format!("🌤 {segment}"));
    }

    if !entry.tags.is_empty() {
        parts.push(format!("🏷 {}", entry.tags.join(", ")));
    }

    if parts.is_empty() {
        None
    } else {
        Some(format!("*{}*", parts.join(" · ")))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// All of a day's entry blocks, in order, joined with a horizontal rule.
pub fn day_content(entries: &[PreparedEntry]) -> String {
    let total = entries.len();
    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| entry_block(entry, Some(idx + 1), total))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}
