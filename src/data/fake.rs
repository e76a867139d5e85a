// ============================================================
// Layer 4 — Fake Source
// ============================================================
// Uniform random RGB images for smoke tests and benchmarking
// without any data on disk. Image `i` is generated from a seed
// derived from `i`, so every epoch sees the same pictures.

use anyhow::{bail, Result};
use image::{DynamicImage, RgbImage};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::domain::traits::ImageSource;

pub const FAKE_DATASET_SIZE: usize = 1000;

pub struct FakeSource {
    len:  usize,
    side: u32,
    seed: u64,
}

impl FakeSource {
    pub fn new(len: usize, side: u32, seed: u64) -> Self {
        Self { len, side, seed }
    }
}

impl ImageSource for FakeSource {
    fn len(&self) -> usize {
        self.len
    }

    fn load(&self, index: usize) -> Result<DynamicImage> {
        if index >= self.len {
            bail!("fake image index {index} out of range ({} images)", self.len);
        }
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(index as u64));
        let img = RgbImage::from_fn(self.side, self.side, |_, _| {
            image::Rgb([rng.gen(), rng.gen(), rng.gen()])
        });
        Ok(DynamicImage::ImageRgb8(img))
    }

    fn describe(&self) -> String {
        format!("{} fake {}x{} images", self.len, self.side, self.side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_images_are_deterministic_per_index() {
        let source = FakeSource::new(4, 8, 42);
        let a = source.load(2).unwrap().to_rgb8();
        let b = source.load(2).unwrap().to_rgb8();
        let c = source.load(3).unwrap().to_rgb8();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.dimensions(), (8, 8));
    }

    #[test]
    fn test_out_of_range() {
        let source = FakeSource::new(1, 8, 0);
        assert!(source.load(1).is_err());
    }
}
