//! Turns Day One markdown into vault-ready markdown.
//!
//! Two transformations run in order. Media embeds written as
//! `![](dayone-moment://<identifier>)` are resolved through the entry's
//! attachments and replaced with Obsidian `![[...]]` embeds, copying the
//! file into the vault as a side effect. Then Day One's backslash-escaping
//! of markdown punctuation is stripped.

use crate::assets;
use crate::store::Attachment;
use crate::utils::MediaSources;
use eyre::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

static MOMENT_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!\[\]\(dayone-moment://([A-Fa-f0-9]+)\)").expect("valid moment link regex")
});

/// Escapes Day One adds to `ZMARKDOWNTEXT`, stripped in this order after
/// moment links are resolved. Period-with-space must run before the bare
/// period.
const ESCAPE_CLEANUPS: [(&str, &str); 10] = [
    ("\\. ", ". "),
    ("\\.", "."),
    ("\\!", "!"),
    ("\\-", "-"),
    ("\\*", "*"),
    ("\\#", "#"),
    ("\\[", "["),
    ("\\]", "]"),
    ("\\(", "("),
    ("\\)", ")"),
];

/// Rewrite one entry's text for the vault.
///
/// `assets_dir` is where media files land on disk; `assets_rel` is the same
/// folder as written inside `![[...]]` embeds, relative to the vault root.
/// Attachment identifiers are matched case-insensitively.
pub fn rewrite_entry_text(
    text: &str,
    attachments: &[Attachment],
    media: &MediaSources,
    assets_dir: &Path,
    assets_rel: &str,
) -> Result<String> {
    let mut media_by_id = HashMap::new();
    for attachment in attachments {
        if let (Some(id), Some(md5)) = (&attachment.identifier, &attachment.md5)
            && !md5.is_empty()
        {
            media_by_id.insert(id.to_uppercase(), md5.clone());
        }
    }

    let mut rewritten = String::with_capacity(text.len());
    let mut last = 0;
    for caps in MOMENT_LINK_RE.captures_iter(text) {
        let (Some(whole), Some(id)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        rewritten.push_str(&text[last..whole.start()]);
        let id = id.as_str().to_uppercase();
        let embed = match media_by_id.get(&id) {
            Some(md5) => assets::materialize(md5, media, assets_dir)?
                .map(|file_name| format!("![[{assets_rel}/{file_name}]]")),
            None => None,
        };
        match embed {
            Some(embed) => rewritten.push_str(&embed),
            None => rewritten.push_str(&format!("[Missing attachment: {id}]")),
        }
        last = whole.end();
    }
    rewritten.push_str(&text[last..]);

    let mut cleaned = rewritten;
    for (escaped, plain) in ESCAPE_CLEANUPS {
        cleaned = cleaned.replace(escaped, plain);
    }
    Ok(cleaned)
}
