// ============================================================
// Layer 6 — Image Grid Writer
// ============================================================
// Tiles a batch of images into one PNG, the way sample sheets are
// usually shown for GANs:
//
//   - at most 8 images per row, 2 px black padding around each
//   - values min–max normalised over the whole batch to [0, 255]
//   - single-channel images are repeated into R, G and B
//
// Input layout is the generator's: [N, C, H, W], C ∈ {1, 3}.

use anyhow::{bail, Context, Result};
use burn::prelude::*;
use image::{Rgb, RgbImage};
use std::path::Path;

pub const GRID_COLUMNS: usize = 8;
pub const GRID_PADDING: usize = 2;

/// Build the grid image from raw NCHW values
pub fn make_grid(values: &[f32], dims: [usize; 4], columns: usize, padding: usize) -> Result<RgbImage> {
    let [n, c, h, w] = dims;
    if n == 0 || columns == 0 {
        bail!("cannot build an image grid from {n} images in {columns} columns");
    }
    if c != 1 && c != 3 {
        bail!("image grid expects 1 or 3 channels, got {c}");
    }
    if values.len() != n * c * h * w {
        bail!("expected {} values for shape {:?}, got {}", n * c * h * w, dims, values.len());
    }

    let low  = values.iter().copied().fold(f32::INFINITY, f32::min);
    let high = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let span = (high - low).max(1e-5);
    let to_byte = |v: f32| (((v - low) / span).clamp(0.0, 1.0) * 255.0 + 0.5) as u8;

    let xmaps = columns.min(n);
    let ymaps = n.div_ceil(xmaps);
    let cell_h = h + padding;
    let cell_w = w + padding;
    let mut grid = RgbImage::new(
        (cell_w * xmaps + padding) as u32,
        (cell_h * ymaps + padding) as u32,
    );

    let plane = h * w;
    for k in 0..n {
        let top  = (k / xmaps) * cell_h + padding;
        let left = (k % xmaps) * cell_w + padding;
        let base = k * c * plane;

        for y in 0..h {
            for x in 0..w {
                let offset = y * w + x;
                let channel = |ch: usize| {
                    let ch = if c == 1 { 0 } else { ch };
                    to_byte(values[base + ch * plane + offset])
                };
                grid.put_pixel(
                    (left + x) as u32,
                    (top + y) as u32,
                    Rgb([channel(0), channel(1), channel(2)]),
                );
            }
        }
    }

    Ok(grid)
}

/// Write a batch tensor as a PNG grid
pub fn save_grid<B: Backend>(images: Tensor<B, 4>, path: &Path) -> Result<()> {
    let dims = images.dims();
    let values = images
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| anyhow::anyhow!("Cannot read image tensor: {e:?}"))?;

    let grid = make_grid(&values, dims, GRID_COLUMNS, GRID_PADDING)?;
    grid.save(path)
        .with_context(|| format!("Cannot write image grid '{}'", path.display()))?;

    tracing::debug!("Wrote {} images to '{}'", dims[0], path.display());
    Ok(())
}
