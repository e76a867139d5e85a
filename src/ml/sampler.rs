// ============================================================
// Layer 5 — Sampler
// ============================================================
// Rebuilds the generator described by a saved train_config.json,
// loads a netG checkpoint into it and renders one grid of images.
//
// Runs on a plain (non-autodiff) backend, so batch norm uses the
// running statistics accumulated during training.

use anyhow::{bail, Result};
use burn::{prelude::*, tensor::Distribution};
use std::path::Path;

use crate::application::train_use_case::TrainConfig;
use crate::infra::{checkpoint::load_module, image_grid::save_grid};
use crate::ml::model::{Generator, GeneratorConfig};

pub fn generate_samples(
    cfg:         &TrainConfig,
    weights:     &Path,
    num_samples: usize,
    seed:        u64,
    cuda:        bool,
    out:         &Path,
) -> Result<()> {
    if num_samples == 0 {
        bail!("--num-samples must be at least 1");
    }
    if cuda {
        let device = burn::backend::wgpu::WgpuDevice::default();
        sample_with::<burn::backend::Wgpu>(cfg, weights, num_samples, seed, out, device)
    } else {
        let device = burn::backend::ndarray::NdArrayDevice::Cpu;
        sample_with::<burn::backend::NdArray>(cfg, weights, num_samples, seed, out, device)
    }
}

fn sample_with<B: Backend>(
    cfg:         &TrainConfig,
    weights:     &Path,
    num_samples: usize,
    seed:        u64,
    out:         &Path,
    device:      B::Device,
) -> Result<()> {
    B::seed(seed);

    let model_cfg = GeneratorConfig::new(cfg.nz, cfg.ngf, cfg.dataset.channels(), cfg.image_size);
    let net_g: Generator<B> = model_cfg.init(&device)?;
    let net_g = load_module(net_g, weights, &device)?;

    let noise = Tensor::<B, 4>::random(
        [num_samples, cfg.nz, 1, 1],
        Distribution::Normal(0.0, 1.0),
        &device,
    );
    save_grid(net_g.forward(noise), out)?;

    tracing::info!("Wrote {} samples to '{}'", num_samples, out.display());
    Ok(())
}
