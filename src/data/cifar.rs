// ============================================================
// Layer 4 — CIFAR-10 Source
// ============================================================
// Reads the CIFAR-10 "binary version" training batches.
//
// File layout (data_batch_1.bin .. data_batch_5.bin):
//   10000 records × 3073 bytes
//   [label: u8][red plane: 1024][green plane: 1024][blue plane: 1024]
//   each plane is 32×32, row-major
//
// Labels are ignored; the GAN is unconditional.

use anyhow::{bail, Context, Result};
use image::{DynamicImage, RgbImage};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::traits::ImageSource;

const CIFAR_SIDE: usize = 32;
const PLANE: usize = CIFAR_SIDE * CIFAR_SIDE;
const RECORD_LEN: usize = 1 + 3 * PLANE;
const TRAIN_BATCHES: [&str; 5] = [
    "data_batch_1.bin",
    "data_batch_2.bin",
    "data_batch_3.bin",
    "data_batch_4.bin",
    "data_batch_5.bin",
];

pub struct CifarSource {
    dir:    PathBuf,
    /// Raw records with the label byte stripped, 3072 bytes each
    pixels: Vec<u8>,
}

impl CifarSource {
    /// Load every training batch found in `root` or
    /// `root/cifar-10-batches-bin`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let dir = locate_batches(root.as_ref())?;
        let mut pixels = Vec::new();

        for name in TRAIN_BATCHES {
            let path = dir.join(name);
            if !path.exists() {
                tracing::warn!("CIFAR-10 batch '{}' missing, skipping", path.display());
                continue;
            }
            let bytes = fs::read(&path)
                .with_context(|| format!("Cannot read '{}'", path.display()))?;
            append_records(&bytes, &mut pixels)
                .with_context(|| format!("Malformed CIFAR-10 batch '{}'", path.display()))?;
        }

        if pixels.is_empty() {
            bail!("No CIFAR-10 training batches found in '{}'", dir.display());
        }

        Ok(Self { dir, pixels })
    }

    /// Build a source straight from record bytes (label + planes)
    #[cfg(test)]
    fn from_records(bytes: &[u8]) -> Result<Self> {
        let mut pixels = Vec::new();
        append_records(bytes, &mut pixels)?;
        Ok(Self { dir: PathBuf::from("<memory>"), pixels })
    }
}

impl ImageSource for CifarSource {
    fn len(&self) -> usize {
        self.pixels.len() / (3 * PLANE)
    }

    fn load(&self, index: usize) -> Result<DynamicImage> {
        if index >= self.len() {
            bail!("CIFAR-10 index {index} out of range ({} images)", self.len());
        }
        let record = &self.pixels[index * 3 * PLANE..(index + 1) * 3 * PLANE];

        // Planar RGB → interleaved RGB
        let mut interleaved = Vec::with_capacity(3 * PLANE);
        for p in 0..PLANE {
            interleaved.push(record[p]);
            interleaved.push(record[PLANE + p]);
            interleaved.push(record[2 * PLANE + p]);
        }

        let img = RgbImage::from_raw(CIFAR_SIDE as u32, CIFAR_SIDE as u32, interleaved)
            .context("CIFAR-10 record has wrong size")?;
        Ok(DynamicImage::ImageRgb8(img))
    }

    fn describe(&self) -> String {
        format!("{} CIFAR-10 images from '{}'", self.len(), self.dir.display())
    }
}

fn locate_batches(root: &Path) -> Result<PathBuf> {
    let nested = root.join("cifar-10-batches-bin");
    for dir in [root.to_path_buf(), nested] {
        if dir.join(TRAIN_BATCHES[0]).exists() {
            return Ok(dir);
        }
    }
    bail!(
        "CIFAR-10 binary batches not found in '{}' (expected data_batch_1.bin, \
         optionally inside cifar-10-batches-bin/)",
        root.display()
    )
}

fn append_records(bytes: &[u8], out: &mut Vec<u8>) -> Result<()> {
    if bytes.len() % RECORD_LEN != 0 {
        bail!(
            "{} bytes is not a multiple of the {}-byte record size",
            bytes.len(),
            RECORD_LEN
        );
    }
    for record in bytes.chunks_exact(RECORD_LEN) {
        out.extend_from_slice(&record[1..]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One record whose red/green/blue planes are constant
    fn record(label: u8, rgb: [u8; 3]) -> Vec<u8> {
        let mut r = vec![label];
        for c in rgb {
            r.extend(std::iter::repeat(c).take(PLANE));
        }
        r
    }

    #[test]
    fn test_planes_are_interleaved() {
        let mut bytes = record(3, [10, 20, 30]);
        bytes.extend(record(7, [200, 100, 0]));
        let source = CifarSource::from_records(&bytes).unwrap();
        assert_eq!(source.len(), 2);

        let img = source.load(1).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (32, 32));
        assert_eq!(img.get_pixel(5, 9).0, [200, 100, 0]);
    }

    #[test]
    fn test_truncated_batch_is_rejected() {
        let bytes = record(0, [1, 1, 1]);
        assert!(CifarSource::from_records(&bytes[..100]).is_err());
    }

    #[test]
    fn test_open_finds_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("cifar-10-batches-bin");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("data_batch_1.bin"), record(1, [5, 6, 7])).unwrap();

        let source = CifarSource::open(dir.path()).unwrap();
        assert_eq!(source.len(), 1);
        assert!(source.load(1).is_err());
    }

    #[test]
    fn test_open_without_batches_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CifarSource::open(dir.path()).is_err());
    }
}
