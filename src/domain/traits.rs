// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The data pipeline only talks to `ImageSource`. Each dataset
// format (image folders, CIFAR-10 binaries, MNIST IDX files, the
// synthetic generator) implements it, so the Burn dataset wrapper
// never needs to know where pixels come from.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use image::DynamicImage;

// ─── ImageSource ──────────────────────────────────────────────────────────────
/// Random-access collection of decoded images.
///
/// Implementations must be shareable between data-loader worker
/// threads, hence the `Send + Sync` bound.
///
/// Implementations:
///   - FolderSource → image files under one or more directories
///   - CifarSource  → CIFAR-10 binary batches
///   - MnistSource  → MNIST IDX image file
///   - FakeSource   → deterministic random images
pub trait ImageSource: Send + Sync {
    /// Number of images available
    fn len(&self) -> usize;

    /// Decode the image at `index` (0-based, `< len()`)
    fn load(&self, index: usize) -> Result<DynamicImage>;

    /// Short human-readable description used in logs
    fn describe(&self) -> String;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
