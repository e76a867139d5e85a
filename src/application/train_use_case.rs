// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a training run in order:
//
//   Step 1: Validate the configuration
//   Step 2: Resolve the random seed     (--manualSeed or random)
//   Step 3: Create the output folder    (Layer 6 - infra)
//   Step 4: Open the dataset            (Layer 4 - data)
//   Step 5: Save config for `generate`  (Layer 6 - infra)
//   Step 6: Run the training loop       (Layer 5 - ml)

use anyhow::{bail, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::{dataset::ImageDataset, open_source, transform::ImageTransform};
use crate::domain::dataset_kind::DatasetKind;
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::{
    model::hidden_depth,
    trainer::{run_training, TrainingSummary},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All flags of a training run. Saved as train_config.json next to
// the checkpoints so the generator can be rebuilt later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub dataset:         DatasetKind,
    pub dataroot:        Option<String>,
    pub workers:         usize,
    pub batch_size:      usize,
    pub image_size:      usize,
    pub nz:              usize,
    pub ngf:             usize,
    pub ndf:             usize,
    pub niter:           usize,
    pub lr:              f64,
    pub beta1:           f64,
    pub cuda:            bool,
    pub dry_run:         bool,
    pub net_g:           Option<String>,
    pub net_d:           Option<String>,
    pub outf:            String,
    pub manual_seed:     Option<u64>,
    pub classes:         Vec<String>,
    pub sample_interval: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            dataset:         DatasetKind::Fake,
            dataroot:        None,
            workers:         2,
            batch_size:      64,
            image_size:      64,
            nz:              100,
            ngf:             64,
            ndf:             64,
            niter:           25,
            lr:              0.0002,
            beta1:           0.5,
            cuda:            false,
            dry_run:         false,
            net_g:           None,
            net_d:           None,
            outf:            ".".to_string(),
            manual_seed:     None,
            classes:         vec!["bedroom".to_string()],
            sample_interval: 100,
        }
    }
}

impl TrainConfig {
    /// Reject flag combinations the trainer cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.dataset.requires_dataroot() && self.dataroot.is_none() {
            bail!("--dataroot is required for dataset '{}'", self.dataset);
        }
        hidden_depth(self.image_size)?;

        for (flag, value) in [
            ("--batchSize", self.batch_size),
            ("--nz", self.nz),
            ("--ngf", self.ngf),
            ("--ndf", self.ndf),
            ("--niter", self.niter),
            ("--sample-interval", self.sample_interval),
        ] {
            if value == 0 {
                bail!("{flag} must be at least 1");
            }
        }

        if !(self.lr.is_finite() && self.lr > 0.0) {
            bail!("--lr must be a positive number, got {}", self.lr);
        }
        if !(0.0..1.0).contains(&self.beta1) {
            bail!("--beta1 must be in [0, 1), got {}", self.beta1);
        }
        if self.dataset == DatasetKind::Lsun && self.classes.is_empty() {
            bail!("--classes must name at least one LSUN class");
        }
        Ok(())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainingSummary> {
        // ── Step 1: Validate ─────────────────────────────────────────────────
        self.config.validate()?;
        let mut cfg = self.config.clone();
        if cfg.dry_run {
            cfg.niter = 1;
        }

        // ── Step 2: Seed ─────────────────────────────────────────────────────
        let seed = cfg
            .manual_seed
            .unwrap_or_else(|| rand::thread_rng().gen_range(1..10000));
        println!("Random Seed: {seed}");
        cfg.manual_seed = Some(seed);

        // ── Step 3: Output folder ────────────────────────────────────────────
        let ckpt = CheckpointManager::new(&cfg.outf)?;

        // ── Step 4: Dataset ──────────────────────────────────────────────────
        let source = open_source(
            cfg.dataset,
            cfg.dataroot.as_deref().map(Path::new),
            &cfg.classes,
            cfg.image_size,
            seed,
        )?;
        let transform = ImageTransform::new(cfg.image_size, cfg.dataset.channels());
        let dataset = ImageDataset::new(source, transform);

        // ── Step 5: Save config ──────────────────────────────────────────────
        // Stored with the resolved seed so a run can be repeated exactly
        ckpt.save_config(&cfg)?;
        let metrics = MetricsLogger::new(ckpt.dir())?;

        // ── Step 6: Train (Layer 5) ──────────────────────────────────────────
        run_training(&cfg, seed, dataset, &ckpt, &metrics)
    }
}
