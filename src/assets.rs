//! Copies Day One media into the vault's asset folder.
//!
//! Day One stores attachments under their MD5 hash with no extension hints in
//! the database, so the file is located by probing every known extension
//! across the photo, video, and audio folders. The asset folder mirrors that
//! naming, which makes re-runs naturally idempotent: a file that is already
//! present is never copied again.

use crate::utils::MediaSources;
use eyre::{Context, Result};
use std::fs;
use std::path::Path;

/// Probe order. Extension takes priority over source folder, so a photo
/// match beats a video match for the same hash.
pub const MEDIA_EXTENSIONS: [&str; 9] = [
    "jpeg", "jpg", "png", "gif", "heic", "mp4", "mov", "m4a", "mp3",
];

/// Ensure the media file for `md5` exists in `assets_dir`, copying it from
/// the Day One folders if needed. Returns the asset file name, or `None`
/// when no source file matches any known extension.
pub fn materialize(md5: &str, media: &MediaSources, assets_dir: &Path) -> Result<Option<String>> {
    for ext in MEDIA_EXTENSIONS {
        let file_name = format!("{md5}.{ext}");
        for source_dir in media.in_order() {
            let source = source_dir.join(&file_name);
            if !source.exists() {
                continue;
            }
            let dest = assets_dir.join(&file_name);
            if !dest.exists() {
                fs::create_dir_all(assets_dir).wrap_err_with(|| {
                    format!("Failed to create assets folder: {}", assets_dir.display())
                })?;
                fs::copy(&source, &dest).wrap_err_with(|| {
                    format!("Failed to copy {} to assets", source.display())
                })?;
            }
            return Ok(Some(file_name));
        }
    }
    Ok(None)
}
