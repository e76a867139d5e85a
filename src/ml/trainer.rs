// ============================================================
// Layer 5 — Adversarial Training Loop
// ============================================================
// One iteration per batch of real images x:
//
//   (1) Discriminator step
//       z ~ N(0, 1),  fake = G(z)
//       err_D = BCE(D(x), 1) + BCE(D(fake.detach()), 0)
//       Adam step on D only
//
//   (2) Generator step, against the updated D
//       err_G = BCE(D(fake), 1)
//       Adam step on G only
//
// GradientsParams::from_grads keeps only the gradients of the
// module it is given, so each optimiser touches its own network.
//
// Every `sample_interval` iterations: real_samples.png and
// fake_samples.png (G applied to a noise batch fixed at start).
// Every epoch: netG_epoch_N.pth, netD_epoch_N.pth, metrics.csv row.
//
// Reference: Radford et al. (2016) DCGAN
//            Burn Book §5 (Custom Training Loop)

use anyhow::{bail, Result};
use burn::{
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::{backend::AutodiffBackend, Distribution},
};
use std::path::Path;

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::ImageBatcher, dataset::ImageDataset};
use crate::infra::{
    checkpoint::{load_module, CheckpointManager},
    image_grid::save_grid,
    metrics::{EpochMetrics, IterationStats, MetricsLogger},
};
use crate::ml::{
    losses::{bce_with_logits, mean_probability, scalar, FAKE_LABEL, REAL_LABEL},
    model::{Discriminator, DiscriminatorConfig, Generator, GeneratorConfig},
};

type GpuBackend = burn::backend::Autodiff<burn::backend::Wgpu>;
type CpuBackend = burn::backend::Autodiff<burn::backend::NdArray>;

/// What a finished run reports back to the CLI
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub epochs:     usize,
    pub iterations: usize,
    /// Averages of the final epoch
    pub last_epoch: Option<IterationStats>,
}

/// Train on the GPU (`--cuda`, WGPU) or the CPU (ndarray) backend
pub fn run_training(
    cfg:      &TrainConfig,
    seed:     u64,
    dataset:  ImageDataset,
    ckpt:     &CheckpointManager,
    metrics:  &MetricsLogger,
) -> Result<TrainingSummary> {
    if cfg.cuda {
        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);
        train_loop::<GpuBackend>(cfg, seed, dataset, ckpt, metrics, device)
    } else {
        let device = burn::backend::ndarray::NdArrayDevice::Cpu;
        tracing::info!("Using CPU device (ndarray)");
        train_loop::<CpuBackend>(cfg, seed, dataset, ckpt, metrics, device)
    }
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:      &TrainConfig,
    seed:     u64,
    dataset:  ImageDataset,
    ckpt:     &CheckpointManager,
    metrics:  &MetricsLogger,
    device:   B::Device,
) -> Result<TrainingSummary> {
    if dataset.is_empty() {
        bail!("Dataset is empty: {}", dataset.describe());
    }
    B::seed(seed);

    // ── Build networks, optionally resuming ──────────────────────────────────
    let nc = dataset.channels();
    let mut net_g: Generator<B> =
        GeneratorConfig::new(cfg.nz, cfg.ngf, nc, cfg.image_size).init(&device)?;
    if let Some(path) = &cfg.net_g {
        net_g = load_module(net_g, Path::new(path), &device)?;
    }
    let mut net_d: Discriminator<B> =
        DiscriminatorConfig::new(cfg.ndf, nc, cfg.image_size).init(&device)?;
    if let Some(path) = &cfg.net_d {
        net_d = load_module(net_d, Path::new(path), &device)?;
    }
    tracing::info!(
        "Generator: {} parameters, discriminator: {} parameters",
        net_g.num_params(),
        net_d.num_params()
    );

    // ── Adam optimisers, one per network ─────────────────────────────────────
    let adam = AdamConfig::new()
        .with_beta_1(cfg.beta1 as f32)
        .with_beta_2(0.999);
    let mut optim_g = adam.init();
    let mut optim_d = adam.init();

    // ── Data loader ──────────────────────────────────────────────────────────
    let num_batches = batches_per_epoch(dataset.len(), cfg.batch_size, cfg.workers);
    let mut builder = DataLoaderBuilder::new(ImageBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(seed);
    if cfg.workers > 0 {
        builder = builder.num_workers(cfg.workers);
    }
    let loader = builder.build(dataset);

    let fixed_noise = Tensor::<B, 4>::random(
        [cfg.batch_size, cfg.nz, 1, 1],
        Distribution::Normal(0.0, 1.0),
        &device,
    );

    tracing::info!("Logging epoch metrics to '{}'", metrics.csv_path().display());
    let mut iterations = 0usize;
    let mut last_epoch = None;

    // ── Epoch loop ───────────────────────────────────────────────────────────
    for epoch in 0..cfg.niter {
        let mut epoch_metrics = EpochMetrics::new(epoch);

        for (i, batch) in loader.iter().enumerate() {
            let real = batch.images;
            let batch_size = real.dims()[0];

            // (1) Discriminator
            let noise = Tensor::<B, 4>::random(
                [batch_size, cfg.nz, 1, 1],
                Distribution::Normal(0.0, 1.0),
                &device,
            );
            let fake = net_g.forward(noise);

            let out_real = net_d.forward(real.clone());
            let out_fake = net_d.forward(fake.clone().detach());
            let d_x    = mean_probability(out_real.clone());
            let d_g_z1 = mean_probability(out_fake.clone());

            let err_d = bce_with_logits(out_real, REAL_LABEL)
                + bce_with_logits(out_fake, FAKE_LABEL);
            let loss_d = scalar(err_d.clone());
            let grads = GradientsParams::from_grads(err_d.backward(), &net_d);
            net_d = optim_d.step(cfg.lr, net_d, grads);

            // (2) Generator
            let out = net_d.forward(fake);
            let d_g_z2 = mean_probability(out.clone());

            let err_g  = bce_with_logits(out, REAL_LABEL);
            let loss_g = scalar(err_g.clone());
            let grads = GradientsParams::from_grads(err_g.backward(), &net_g);
            net_g = optim_g.step(cfg.lr, net_g, grads);

            let stats = IterationStats { loss_d, loss_g, d_x, d_g_z1, d_g_z2 };
            epoch_metrics.record(&stats);
            iterations += 1;

            println!(
                "[{}/{}][{}/{}] Loss_D: {:.4} Loss_G: {:.4} D(x): {:.4} D(G(z)): {:.4} / {:.4}",
                epoch, cfg.niter, i, num_batches,
                loss_d, loss_g, d_x, d_g_z1, d_g_z2,
            );

            if i % cfg.sample_interval == 0 {
                save_samples(ckpt.dir(), real, &net_g, &fixed_noise, epoch)?;
            }

            if cfg.dry_run {
                break;
            }
        }

        ckpt.save_epoch(&net_g, &net_d, epoch)?;
        metrics.log(&epoch_metrics)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
        last_epoch = Some(epoch_metrics.mean());
    }

    tracing::info!("Training complete after {} iterations", iterations);
    Ok(TrainingSummary { epochs: cfg.niter, iterations, last_epoch })
}

/// Batches the loader yields per epoch. With workers the dataset is cut
/// into `workers` contiguous parts (the last one takes the remainder)
/// and each part is batched on its own, so partial batches can add up.
fn batches_per_epoch(len: usize, batch_size: usize, workers: usize) -> usize {
    if workers == 0 {
        return len.div_ceil(batch_size);
    }
    let part = len / workers;
    let last = len - part * (workers - 1);
    part.div_ceil(batch_size) * (workers - 1) + last.div_ceil(batch_size)
}

/// real_samples.png, fake_samples.png and fake_samples_epoch_NNN.png
fn save_samples<B: Backend>(
    dir:         &Path,
    real:        Tensor<B, 4>,
    net_g:       &Generator<B>,
    fixed_noise: &Tensor<B, 4>,
    epoch:       usize,
) -> Result<()> {
    save_grid(real, &dir.join("real_samples.png"))?;

    let fake = net_g.forward(fixed_noise.clone()).detach();
    save_grid(fake.clone(), &dir.join("fake_samples.png"))?;
    save_grid(fake, &dir.join(format!("fake_samples_epoch_{epoch:03}.png")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{fake::FakeSource, transform::ImageTransform};
    use crate::domain::dataset_kind::DatasetKind;

    fn tiny_config(outf: &Path) -> TrainConfig {
        TrainConfig {
            dataset:         DatasetKind::Fake,
            workers:         0,
            batch_size:      4,
            image_size:      16,
            nz:              8,
            ngf:             4,
            ndf:             4,
            niter:           2,
            outf:            outf.display().to_string(),
            sample_interval: 1,
            ..TrainConfig::default()
        }
    }

    fn fake_dataset(len: usize) -> ImageDataset {
        ImageDataset::new(Box::new(FakeSource::new(len, 16, 7)), ImageTransform::new(16, 3))
    }

    #[test]
    fn test_short_run_writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny_config(dir.path());
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        let metrics = MetricsLogger::new(dir.path()).unwrap();

        let summary = train_loop::<CpuBackend>(
            &cfg, 3, fake_dataset(6), &ckpt, &metrics, Default::default(),
        )
        .unwrap();

        // 6 images in batches of 4 → 2 iterations per epoch
        assert_eq!(summary.epochs, 2);
        assert_eq!(summary.iterations, 4);
        let last = summary.last_epoch.unwrap();
        assert!(last.loss_d.is_finite() && last.loss_g.is_finite());
        assert!((0.0..=1.0).contains(&last.d_x));

        for name in [
            "real_samples.png",
            "fake_samples.png",
            "fake_samples_epoch_001.png",
            "netG_epoch_0.pth",
            "netD_epoch_0.pth",
            "netG_epoch_1.pth",
            "netD_epoch_1.pth",
            "metrics.csv",
        ] {
            assert!(dir.path().join(name).exists(), "missing {name}");
        }
    }

    #[test]
    fn test_worker_threads_cover_every_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = tiny_config(dir.path());
        cfg.workers = 2;
        cfg.niter = 1;
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        let metrics = MetricsLogger::new(dir.path()).unwrap();

        let summary = train_loop::<CpuBackend>(
            &cfg, 9, fake_dataset(6), &ckpt, &metrics, Default::default(),
        )
        .unwrap();

        // Two workers of 3 images each, batch size 4 → one batch per worker
        assert_eq!(summary.iterations, batches_per_epoch(6, 4, 2));
        assert_eq!(summary.iterations, 2);
        for name in ["real_samples.png", "fake_samples.png", "netG_epoch_0.pth", "netD_epoch_0.pth"] {
            assert!(dir.path().join(name).exists(), "missing {name}");
        }
        let csv = std::fs::read_to_string(metrics.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 2);
    }

    #[test]
    fn test_batches_per_epoch() {
        assert_eq!(batches_per_epoch(6, 4, 0), 2);
        assert_eq!(batches_per_epoch(10, 4, 0), 3);
        // 5 + 5 images → 2 partial batches each
        assert_eq!(batches_per_epoch(10, 4, 2), 4);
        // 3 + 3 + 4 images
        assert_eq!(batches_per_epoch(10, 4, 3), 3);
        // More workers than images: empty parts yield nothing
        assert_eq!(batches_per_epoch(2, 4, 3), 1);
    }

    #[test]
    fn test_dry_run_stops_after_one_iteration_and_resumes() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = tiny_config(dir.path());
        cfg.niter = 1;
        cfg.dry_run = true;
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        let metrics = MetricsLogger::new(dir.path()).unwrap();

        let summary = train_loop::<CpuBackend>(
            &cfg, 5, fake_dataset(12), &ckpt, &metrics, Default::default(),
        )
        .unwrap();
        assert_eq!(summary.iterations, 1);

        // Resume both networks from the checkpoints just written
        cfg.net_g = Some(ckpt.generator_path(0).display().to_string());
        cfg.net_d = Some(ckpt.discriminator_path(0).display().to_string());
        let resumed = train_loop::<CpuBackend>(
            &cfg, 5, fake_dataset(12), &ckpt, &metrics, Default::default(),
        );
        assert!(resumed.is_ok());
    }

    #[test]
    fn test_resume_with_wrong_architecture_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = tiny_config(dir.path());
        cfg.niter = 1;
        cfg.dry_run = true;
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        let metrics = MetricsLogger::new(dir.path()).unwrap();
        train_loop::<CpuBackend>(&cfg, 1, fake_dataset(4), &ckpt, &metrics, Default::default())
            .unwrap();

        cfg.ngf = 8;
        cfg.net_g = Some(ckpt.generator_path(0).display().to_string());
        let result =
            train_loop::<CpuBackend>(&cfg, 1, fake_dataset(4), &ckpt, &metrics, Default::default());
        assert!(result.is_err());
    }
}
