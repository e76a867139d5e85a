use burn::data::dataset::Dataset;

use crate::data::transform::ImageTransform;
use crate::domain::traits::ImageSource;

/// How many following images to try when one fails to decode
const MAX_DECODE_ATTEMPTS: usize = 8;

/// One transformed image. Layout: CHW, values in [-1, 1].
#[derive(Debug, Clone)]
pub struct ImageSample {
    pub pixels:   Vec<f32>,
    pub channels: usize,
    pub size:     usize,
}

pub struct ImageDataset {
    source:    Box<dyn ImageSource>,
    transform: ImageTransform,
}

impl ImageDataset {
    pub fn new(source: Box<dyn ImageSource>, transform: ImageTransform) -> Self {
        Self { source, transform }
    }

    pub fn channels(&self) -> usize { self.transform.channels }

    pub fn describe(&self) -> String { self.source.describe() }
}

impl Dataset<ImageSample> for ImageDataset {
    /// A file that fails to decode is replaced by the next readable one,
    /// wrapping around; the data loader stops an epoch at the first `None`.
    fn get(&self, index: usize) -> Option<ImageSample> {
        let len = self.source.len();
        if index >= len {
            return None;
        }

        for attempt in 0..MAX_DECODE_ATTEMPTS.min(len) {
            let candidate = (index + attempt) % len;
            match self.source.load(candidate) {
                Ok(img) => {
                    return Some(ImageSample {
                        pixels:   self.transform.apply(&img),
                        channels: self.transform.channels,
                        size:     self.transform.size,
                    });
                }
                Err(e) => tracing::warn!("Skipping image {}: {:#}", candidate, e),
            }
        }

        tracing::error!(
            "No readable image among {} candidates starting at index {}",
            MAX_DECODE_ATTEMPTS.min(len),
            index
        );
        None
    }

    fn len(&self) -> usize {
        self.source.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};
    use image::{DynamicImage, RgbImage};

    /// Every odd index fails to decode
    struct FlakySource;

    impl ImageSource for FlakySource {
        fn len(&self) -> usize { 4 }

        fn load(&self, index: usize) -> Result<DynamicImage> {
            if index % 2 == 1 {
                bail!("corrupt file {index}");
            }
            let value = index as u8 * 60;
            Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, image::Rgb([value; 3]))))
        }

        fn describe(&self) -> String { "flaky".to_string() }
    }

    #[test]
    fn test_samples_have_expected_shape() {
        let ds = ImageDataset::new(Box::new(FlakySource), ImageTransform::new(2, 3));
        let sample = ds.get(0).unwrap();
        assert_eq!(sample.pixels.len(), 12);
        assert_eq!((sample.channels, sample.size), (3, 2));
        assert_eq!(ds.len(), 4);
    }

    #[test]
    fn test_corrupt_image_falls_through_to_next() {
        let ds = ImageDataset::new(Box::new(FlakySource), ImageTransform::new(2, 3));
        let from_bad  = ds.get(1).unwrap();
        let from_good = ds.get(2).unwrap();
        assert_eq!(from_bad.pixels, from_good.pixels);

        // Index 3 wraps around to 0
        let wrapped = ds.get(3).unwrap();
        assert_eq!(wrapped.pixels, ds.get(0).unwrap().pixels);
    }

    #[test]
    fn test_out_of_range_is_none() {
        let ds = ImageDataset::new(Box::new(FlakySource), ImageTransform::new(2, 3));
        assert!(ds.get(4).is_none());
    }
}
