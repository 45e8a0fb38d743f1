//! Slide model and directory scanning.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::{DirEntry, WalkDir};

use crate::error::Error;

/// One slide in the deck. Immutable once handed to the slider; identity is
/// the `id` string, not the list position.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Slide {
    pub id: String,
    /// Path to the slide image. A slide with no image renders its
    /// background color.
    #[serde(default)]
    pub image: Option<PathBuf>,
    /// RGB placeholder color used when the image is missing or fails to
    /// decode. Defaults to mid-gray.
    #[serde(default = "Slide::default_background")]
    pub background_color: [u8; 3],
}

impl Slide {
    pub(crate) fn default_background() -> [u8; 3] {
        [128, 128, 128]
    }

    /// Build a slide from an image path, using the file stem as id.
    #[must_use]
    pub fn from_path(path: PathBuf) -> Self {
        let id = path
            .file_stem()
            .map_or_else(|| path.to_string_lossy().into_owned(), |s| {
                s.to_string_lossy().into_owned()
            });
        Self {
            id,
            image: Some(path),
            background_color: Self::default_background(),
        }
    }
}

/// Return `true` if `path` has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    let exts: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| *e == ext)
        })
}

/// Scan `root` recursively for images and build a slide per file, sorted by
/// path so the deck order is stable across runs.
///
/// # Errors
/// Returns [`Error::BadDir`] if `root` is missing or not a directory, and
/// [`Error::EmptyScan`] if no supported images are found.
pub fn scan_slides(root: &Path) -> Result<Vec<Slide>, Error> {
    if !root.exists() || !root.is_dir() {
        return Err(Error::BadDir(root.to_string_lossy().into_owned()));
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !should_skip_dir(e))
        .flatten()
    {
        let path = entry.path();
        if path.is_file() && is_supported_image(path) {
            paths.push(path.to_path_buf());
        }
    }
    if paths.is_empty() {
        return Err(Error::EmptyScan);
    }
    paths.sort();

    Ok(paths.into_iter().map(Slide::from_path).collect())
}

fn should_skip_dir(entry: &DirEntry) -> bool {
    // Never skip the root; tempfile roots can be dot-dirs.
    if entry.depth() == 0 {
        return false;
    }
    if !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|n| n.starts_with('.'))
}
