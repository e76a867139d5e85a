// ============================================================
// Layer 4 — Image Folder Source
// ============================================================
// Walks one or more directories recursively and indexes every file
// with a known image extension. Files are decoded lazily, one per
// `load()` call, so large collections (ImageNet, LFW) never have to
// fit in memory.
//
// The same reader serves `imagenet`, `folder` and `lfw` (a single
// root) and `lsun` (one `<class>_train` directory per class).
//
// Reference: walkdir crate documentation
//            image crate documentation

use anyhow::{bail, Context, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::domain::traits::ImageSource;

/// File extensions accepted as images (compared lowercase)
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "bmp", "gif", "ppm", "pgm", "tif", "tiff", "webp",
];

pub struct FolderSource {
    roots: Vec<PathBuf>,
    paths: Vec<PathBuf>,
}

impl FolderSource {
    /// Index every image below `root`
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        Self::open_many(vec![root.as_ref().to_path_buf()])
    }

    /// Index every image below each of `roots`, in root order.
    /// Fails when a root is missing or no image is found at all.
    pub fn open_many(roots: Vec<PathBuf>) -> Result<Self> {
        let mut paths = Vec::new();

        for root in &roots {
            if !root.is_dir() {
                bail!("Image directory '{}' does not exist", root.display());
            }

            let mut found: Vec<PathBuf> = Vec::new();
            for entry in WalkDir::new(root).follow_links(true) {
                let entry = entry
                    .with_context(|| format!("Cannot walk '{}'", root.display()))?;
                if entry.file_type().is_file() && has_image_extension(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            // Directory order is filesystem dependent; sort for reproducible epochs
            found.sort();

            tracing::debug!("Indexed {} images under '{}'", found.len(), root.display());
            paths.extend(found);
        }

        if paths.is_empty() {
            let shown: Vec<String> = roots.iter().map(|r| r.display().to_string()).collect();
            bail!(
                "Found 0 images under '{}'. Supported extensions: {}",
                shown.join("', '"),
                IMAGE_EXTENSIONS.join(", ")
            );
        }

        Ok(Self { roots, paths })
    }
}

impl ImageSource for FolderSource {
    fn len(&self) -> usize {
        self.paths.len()
    }

    fn load(&self, index: usize) -> Result<DynamicImage> {
        let path = self
            .paths
            .get(index)
            .with_context(|| format!("Image index {index} out of range"))?;
        image::open(path).with_context(|| format!("Cannot decode '{}'", path.display()))
    }

    fn describe(&self) -> String {
        let shown: Vec<String> = self.roots.iter().map(|r| r.display().to_string()).collect();
        format!("{} images from '{}'", self.paths.len(), shown.join("', '"))
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
