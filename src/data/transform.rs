// ============================================================
// Layer 4 — Image Transform
// ============================================================
// Turns a decoded image of any size into network input:
//
//   1. Resize so the shorter side equals `size`, then centre-crop
//      to size × size (image's resize_to_fill does both)
//   2. Convert to the dataset's channel count (RGB or grayscale)
//   3. Scale bytes to [0, 1], then normalise with mean 0.5 and
//      std 0.5 → [-1, 1], the range of the generator's tanh output
//   4. Lay out channel-major (CHW), the layout Burn convolutions use

use image::{imageops::FilterType, DynamicImage};

#[derive(Debug, Clone, Copy)]
pub struct ImageTransform {
    pub size:     usize,
    pub channels: usize,
}

impl ImageTransform {
    pub fn new(size: usize, channels: usize) -> Self {
        Self { size, channels }
    }

    /// Number of floats produced per image
    pub fn output_len(&self) -> usize {
        self.channels * self.size * self.size
    }

    pub fn apply(&self, img: &DynamicImage) -> Vec<f32> {
        let side = self.size as u32;
        let fitted = if img.width() == side && img.height() == side {
            img.clone()
        } else {
            img.resize_to_fill(side, side, FilterType::Triangle)
        };

        let plane = self.size * self.size;
        let mut out = vec![0.0f32; self.output_len()];

        if self.channels == 1 {
            let gray = fitted.to_luma8();
            for (i, p) in gray.pixels().enumerate() {
                out[i] = normalize(p.0[0]);
            }
        } else {
            let rgb = fitted.to_rgb8();
            for (i, p) in rgb.pixels().enumerate() {
                for c in 0..3 {
                    out[c * plane + i] = normalize(p.0[c]);
                }
            }
        }
        out
    }
}

fn normalize(byte: u8) -> f32 {
    (byte as f32 / 255.0 - 0.5) / 0.5
}
