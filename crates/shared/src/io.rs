use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

use crate::digest::Digest;

/// Where dry-run previews go when no directory is given.
pub fn get_default_preview_dir() -> PathBuf {
    dirs::document_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Write the digest's HTML body and social post (if any) to `dir`.
/// Returns the paths written, HTML first.
pub fn save_preview(dir: &Path, digest: &Digest, date: NaiveDate) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create preview directory: {}", dir.display()))?;

    let stem = format!("fraud-digest-{}", date.format("%Y-%m-%d"));
    let mut written = Vec::new();

    let html_path = dir.join(format!("{}.html", stem));
    fs::write(&html_path, &digest.html_body).context("Failed to write digest HTML")?;
    written.push(html_path);

    if let Some(post) = &digest.social_post {
        let post_path = dir.join(format!("{}-post.txt", stem));
        fs::write(&post_path, post).context("Failed to write social post")?;
        written.push(post_path);
    }

    Ok(written)
}
