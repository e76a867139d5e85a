// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from files on disk to GPU-ready tensor batches:
//
//   dataset files
//       │
//       ▼
//   ImageSource       → FolderSource / CifarSource / MnistSource / FakeSource
//       │
//       ▼
//   ImageTransform    → resize + centre crop, normalise to [-1, 1], CHW
//       │
//       ▼
//   ImageDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   ImageBatcher      → stacks samples into [N, C, S, S] tensors
//       │
//       ▼
//   DataLoader        → shuffles, spreads decoding over worker threads
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

use anyhow::{Context, Result};
use std::path::Path;

use crate::domain::{dataset_kind::DatasetKind, traits::ImageSource};

/// Recursive image-folder reader (imagenet, folder, lfw, lsun)
pub mod folder;

/// CIFAR-10 binary batch reader
pub mod cifar;

/// MNIST IDX reader
pub mod mnist;

/// Deterministic random images
pub mod fake;

/// Resize, crop and normalise
pub mod transform;

/// Implements Burn's Dataset trait for transformed images
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

use cifar::CifarSource;
use fake::{FakeSource, FAKE_DATASET_SIZE};
use folder::FolderSource;
use mnist::MnistSource;

/// Open the reader for `kind`.
///
/// `dataroot` may only be `None` for the fake dataset; `lsun_classes`
/// names the LSUN categories, each read from `<dataroot>/<class>_train`.
pub fn open_source(
    kind:         DatasetKind,
    dataroot:     Option<&Path>,
    lsun_classes: &[String],
    image_size:   usize,
    seed:         u64,
) -> Result<Box<dyn ImageSource>> {
    let root = || {
        dataroot.with_context(|| format!("--dataroot is required for dataset '{kind}'"))
    };

    let source: Box<dyn ImageSource> = match kind {
        DatasetKind::Imagenet | DatasetKind::Folder | DatasetKind::Lfw => {
            Box::new(FolderSource::open(root()?)?)
        }
        DatasetKind::Lsun => {
            let root = root()?;
            let dirs = lsun_classes
                .iter()
                .map(|class| root.join(format!("{class}_train")))
                .collect();
            Box::new(FolderSource::open_many(dirs).context("Cannot open LSUN classes")?)
        }
        DatasetKind::Cifar10 => Box::new(CifarSource::open(root()?)?),
        DatasetKind::Mnist   => Box::new(MnistSource::open(root()?)?),
        DatasetKind::Fake    => {
            Box::new(FakeSource::new(FAKE_DATASET_SIZE, image_size as u32, seed))
        }
    };

    tracing::info!("Dataset '{}': {}", kind, source.describe());
    Ok(source)
}
