// ============================================================
// Layer 2 — GenerateUseCase
// ============================================================
// Renders images from a trained generator:
//
//   Step 1: Find the run config (explicit, or next to the weights)
//   Step 2: Load it                      (Layer 6 - infra)
//   Step 3: Rebuild G, load weights, sample, write the grid (Layer 5)

use anyhow::Result;
use rand::Rng;
use std::path::PathBuf;

use crate::infra::checkpoint::{load_config, CONFIG_FILE};
use crate::ml::sampler::generate_samples;

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub net_g:       PathBuf,
    pub config:      Option<PathBuf>,
    pub num_samples: usize,
    pub out:         PathBuf,
    pub seed:        Option<u64>,
    pub cuda:        bool,
}

pub struct GenerateUseCase {
    request: GenerateRequest,
}

impl GenerateUseCase {
    pub fn new(request: GenerateRequest) -> Self {
        Self { request }
    }

    /// Config path used when `--config` is not given
    pub fn config_path(&self) -> PathBuf {
        match &self.request.config {
            Some(path) => path.clone(),
            None => self
                .request
                .net_g
                .parent()
                .map(|dir| dir.join(CONFIG_FILE))
                .unwrap_or_else(|| PathBuf::from(CONFIG_FILE)),
        }
    }

    pub fn execute(&self) -> Result<PathBuf> {
        let req = &self.request;
        let cfg = load_config(&self.config_path())?;
        let seed = req.seed.unwrap_or_else(|| rand::thread_rng().gen_range(1..10000));
        tracing::info!("Sampling {} images with seed {}", req.num_samples, seed);

        generate_samples(&cfg, &req.net_g, req.num_samples, seed, req.cuda, &req.out)?;
        Ok(req.out.clone())
    }
}
