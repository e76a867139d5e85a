// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Training flags keep the camelCase spellings DCGAN users know
// (--batchSize, --imageSize, --netG, ...). Training is the default
// command; `generate` is the only subcommand.
//
// Reference: Rust Book §12 (Building a CLI Program)

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::generate_use_case::GenerateRequest;
use crate::application::train_use_case::TrainConfig;
use crate::domain::dataset_kind::DatasetKind;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render images from a trained generator checkpoint
    Generate(GenerateArgs),
}

/// All arguments of a training run
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// cifar10 | lsun | mnist | imagenet | folder | lfw | fake
    // Optional only so that `generate` can skip it; required otherwise
    #[arg(long, required = true)]
    pub dataset: Option<DatasetKind>,

    /// Path to the dataset (not needed for `fake`)
    #[arg(long)]
    pub dataroot: Option<String>,

    /// Number of data loading workers (0 loads on the training thread)
    #[arg(long, default_value_t = 2)]
    pub workers: usize,

    #[arg(long = "batchSize", default_value_t = 64)]
    pub batch_size: usize,

    /// Height / width of the input images (power of two, >= 16)
    #[arg(long = "imageSize", default_value_t = 64)]
    pub image_size: usize,

    /// Size of the latent z vector
    #[arg(long, default_value_t = 100)]
    pub nz: usize,

    #[arg(long, default_value_t = 64)]
    pub ngf: usize,

    #[arg(long, default_value_t = 64)]
    pub ndf: usize,

    /// Number of epochs to train for
    #[arg(long, default_value_t = 25)]
    pub niter: usize,

    #[arg(long, default_value_t = 0.0002)]
    pub lr: f64,

    /// beta1 for Adam
    #[arg(long, default_value_t = 0.5)]
    pub beta1: f64,

    /// Train on the GPU (WGPU backend)
    #[arg(long)]
    pub cuda: bool,

    /// Check a single training cycle works
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Path to netG (to continue training)
    #[arg(long = "netG")]
    pub net_g: Option<String>,

    /// Path to netD (to continue training)
    #[arg(long = "netD")]
    pub net_d: Option<String>,

    /// Folder to output images and model checkpoints
    #[arg(long, default_value = ".")]
    pub outf: String,

    #[arg(long = "manualSeed")]
    pub manual_seed: Option<u64>,

    /// Comma separated list of LSUN classes
    #[arg(long, default_value = "bedroom", value_delimiter = ',')]
    pub classes: Vec<String>,

    /// Iterations between real/fake sample grids
    #[arg(long = "sample-interval", default_value_t = 100)]
    pub sample_interval: usize,
}

/// The application layer never sees clap types
impl TryFrom<TrainArgs> for TrainConfig {
    type Error = anyhow::Error;

    fn try_from(a: TrainArgs) -> Result<Self> {
        let dataset = a.dataset.context("--dataset is required")?;
        Ok(TrainConfig {
            dataset,
            dataroot:        a.dataroot,
            workers:         a.workers,
            batch_size:      a.batch_size,
            image_size:      a.image_size,
            nz:              a.nz,
            ngf:             a.ngf,
            ndf:             a.ndf,
            niter:           a.niter,
            lr:              a.lr,
            beta1:           a.beta1,
            cuda:            a.cuda,
            dry_run:         a.dry_run,
            net_g:           a.net_g,
            net_d:           a.net_d,
            outf:            a.outf,
            manual_seed:     a.manual_seed,
            classes:         a.classes,
            sample_interval: a.sample_interval,
        })
    }
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Generator checkpoint (netG_epoch_N.pth)
    #[arg(long = "netG")]
    pub net_g: PathBuf,

    /// Training config; defaults to train_config.json next to --netG
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long = "num-samples", default_value_t = 64)]
    pub num_samples: usize,

    /// Output PNG
    #[arg(long, default_value = "generated.png")]
    pub out: PathBuf,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub cuda: bool,
}

impl From<GenerateArgs> for GenerateRequest {
    fn from(a: GenerateArgs) -> Self {
        GenerateRequest {
            net_g:       a.net_g,
            config:      a.config,
            num_samples: a.num_samples,
            out:         a.out,
            seed:        a.seed,
            cuda:        a.cuda,
        }
    }
}
