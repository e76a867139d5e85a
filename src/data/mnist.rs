// ============================================================
// Layer 4 — MNIST Source
// ============================================================
// Reads the uncompressed IDX3 image file `train-images-idx3-ubyte`.
//
// IDX3 header (big-endian u32s):
//   magic = 2051, count, rows, cols
// followed by count × rows × cols grayscale bytes.

use anyhow::{bail, Context, Result};
use image::{DynamicImage, GrayImage};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::traits::ImageSource;

const IDX3_MAGIC: u32 = 2051;
const HEADER_LEN: usize = 16;
const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";

pub struct MnistSource {
    path:   PathBuf,
    rows:      usize,
    cols:      usize,
    /// rows × cols, non-zero
    per_image: usize,
    pixels:    Vec<u8>,
}

impl MnistSource {
    /// Looks for the image file in `root`, `root/raw` and `root/MNIST/raw`
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let path = [
            root.join(TRAIN_IMAGES),
            root.join("raw").join(TRAIN_IMAGES),
            root.join("MNIST").join("raw").join(TRAIN_IMAGES),
        ]
        .into_iter()
        .find(|p| p.exists())
        .with_context(|| format!("'{TRAIN_IMAGES}' not found under '{}'", root.display()))?;

        let bytes = fs::read(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        let mut source = Self::from_idx(&bytes)
            .with_context(|| format!("Malformed IDX file '{}'", path.display()))?;
        source.path = path;
        Ok(source)
    }

    pub fn from_idx(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            bail!("IDX header truncated ({} bytes)", bytes.len());
        }
        let magic = read_u32(bytes, 0);
        if magic != IDX3_MAGIC {
            bail!("bad IDX3 magic {magic}, expected {IDX3_MAGIC}");
        }
        let count = read_u32(bytes, 4) as usize;
        let rows  = read_u32(bytes, 8) as usize;
        let cols  = read_u32(bytes, 12) as usize;

        if rows == 0 || cols == 0 {
            bail!("IDX header declares empty {rows}x{cols} images");
        }
        let per_image = rows
            .checked_mul(cols)
            .with_context(|| format!("IDX image size {rows}x{cols} overflows"))?;
        let expected = count
            .checked_mul(per_image)
            .with_context(|| format!("IDX header size {count}x{rows}x{cols} overflows"))?;
        let body = &bytes[HEADER_LEN..];
        if body.len() < expected {
            bail!("IDX body holds {} bytes, header promises {}", body.len(), expected);
        }

        Ok(Self {
            path:   PathBuf::from("<memory>"),
            rows,
            cols,
            per_image,
            pixels: body[..expected].to_vec(),
        })
    }
}

impl ImageSource for MnistSource {
    fn len(&self) -> usize {
        self.pixels.len() / self.per_image
    }

    fn load(&self, index: usize) -> Result<DynamicImage> {
        if index >= self.len() {
            bail!("MNIST index {index} out of range ({} images)", self.len());
        }
        let start = index * self.per_image;
        let raw = self.pixels[start..start + self.per_image].to_vec();
        let img = GrayImage::from_raw(self.cols as u32, self.rows as u32, raw)
            .context("MNIST image has wrong size")?;
        Ok(DynamicImage::ImageLuma8(img))
    }

    fn describe(&self) -> String {
        format!(
            "{} MNIST images ({}x{}) from '{}'",
            self.len(),
            self.cols,
            self.rows,
            self.path.display()
        )
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(count: u32, rows: u32, cols: u32, fill: impl Fn(usize) -> u8) -> Vec<u8> {
        let mut bytes = Vec::new();
        for v in [IDX3_MAGIC, count, rows, cols] {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        let n = (count * rows * cols) as usize;
        bytes.extend((0..n).map(fill));
        bytes
    }

    #[test]
    fn test_parse_header_and_images() {
        let bytes  = idx(3, 2, 4, |i| i as u8);
        let source = MnistSource::from_idx(&bytes).unwrap();
        assert_eq!(source.len(), 3);

        let img = source.load(2).unwrap().to_luma8();
        assert_eq!(img.dimensions(), (4, 2));
        // Third image starts at byte 16; pixel (1, 1) is offset 5 within it
        assert_eq!(img.get_pixel(1, 1).0, [21]);
    }

    #[test]
    fn test_bad_magic_is_rejected() {
        let mut bytes = idx(1, 2, 2, |_| 0);
        bytes[3] = 1;
        let err = MnistSource::from_idx(&bytes).err().unwrap();
        assert!(err.to_string().contains("magic"));
    }

    #[test]
    fn test_short_body_is_rejected() {
        let bytes = idx(2, 4, 4, |_| 9);
        assert!(MnistSource::from_idx(&bytes[..30]).is_err());
    }

    #[test]
    fn test_oversized_header_is_rejected() {
        let mut bytes = Vec::new();
        for v in [IDX3_MAGIC, u32::MAX, u32::MAX, u32::MAX] {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        bytes.extend_from_slice(&[0u8; 64]);
        assert!(MnistSource::from_idx(&bytes).is_err());
    }

    #[test]
    fn test_zero_sized_images_are_rejected() {
        let bytes = idx(4, 0, 28, |_| 0);
        let err = MnistSource::from_idx(&bytes).err().unwrap();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_open_searches_raw_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("MNIST").join("raw");
        fs::create_dir_all(&raw).unwrap();
        fs::write(raw.join(TRAIN_IMAGES), idx(1, 28, 28, |_| 255)).unwrap();

        let source = MnistSource::open(dir.path()).unwrap();
        assert_eq!(source.len(), 1);
        assert!(source.describe().contains("28x28"));
    }
}
