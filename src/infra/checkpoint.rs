// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores network weights and the run configuration.
//
// File naming convention (epochs are 0-based):
//   <outf>/
//     netG_epoch_0.pth      ← generator after epoch 0
//     netD_epoch_0.pth      ← discriminator after epoch 0
//     ...
//     train_config.json     ← flags of the run, needed to rebuild
//                             the generator for `generate`
//
// Weights are Burn records serialised by NamedMpkBytesRecorder at
// full precision (named MessagePack). The recorder writes to memory
// and the bytes are stored under the exact file name above, so the
// recorder cannot swap in its own extension. A loaded record whose
// parameter shapes differ from the freshly built network is rejected.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{bail, Context, Result};
use burn::{
    module::{ModuleVisitor, ParamId},
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkBytesRecorder, Recorder},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::{Discriminator, Generator};

pub const CONFIG_FILE: &str = "train_config.json";

type WeightsRecorder = NamedMpkBytesRecorder<FullPrecisionSettings>;

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create the output directory (like `mkdir -p`) if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output folder '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn generator_path(&self, epoch: usize) -> PathBuf {
        self.dir.join(format!("netG_epoch_{epoch}.pth"))
    }

    pub fn discriminator_path(&self, epoch: usize) -> PathBuf {
        self.dir.join(format!("netD_epoch_{epoch}.pth"))
    }

    /// Save both networks for `epoch`
    pub fn save_epoch<B: Backend>(
        &self,
        generator:     &Generator<B>,
        discriminator: &Discriminator<B>,
        epoch:         usize,
    ) -> Result<()> {
        save_module::<B, _>(generator, &self.generator_path(epoch))?;
        save_module::<B, _>(discriminator, &self.discriminator_path(epoch))?;
        tracing::debug!("Saved checkpoints for epoch {}", epoch);
        Ok(())
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }
}

/// Serialise a module's parameters to `path`
pub fn save_module<B: Backend, M: Module<B>>(module: &M, path: &Path) -> Result<()> {
    let bytes = WeightsRecorder::default()
        .record(module.clone().into_record(), ())
        .map_err(|e| anyhow::anyhow!("Cannot serialise weights: {e:?}"))?;
    fs::write(path, bytes)
        .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))
}

/// Load parameters from `path` into an already built module of the
/// same architecture
pub fn load_module<B: Backend, M: Module<B>>(module: M, path: &Path, device: &B::Device) -> Result<M> {
    let bytes = fs::read(path)
        .with_context(|| format!("Cannot read checkpoint '{}'", path.display()))?;
    let record = WeightsRecorder::default()
        .load(bytes, device)
        .map_err(|e| {
            anyhow::anyhow!(
                "Checkpoint '{}' does not match the network architecture: {e:?}",
                path.display()
            )
        })?;

    let expected = param_shapes(&module);
    let loaded = module.load_record(record);
    let found = param_shapes(&loaded);
    if found != expected {
        let position = expected
            .iter()
            .zip(&found)
            .position(|(want, got)| want != got)
            .unwrap_or(expected.len().min(found.len()));
        bail!(
            "Checkpoint '{}' does not fit the network: parameter #{position} is {:?}, \
             expected {:?}. Were --nz/--ngf/--ndf/--imageSize the same when it was saved?",
            path.display(),
            found.get(position),
            expected.get(position),
        );
    }

    tracing::info!("Loaded weights from '{}'", path.display());
    Ok(loaded)
}

/// Collects the shape of every float parameter in visiting order
#[derive(Default)]
struct ShapeCollector {
    shapes: Vec<Vec<usize>>,
}

impl<B: Backend> ModuleVisitor<B> for ShapeCollector {
    fn visit_float<const D: usize>(&mut self, _id: ParamId, tensor: &Tensor<B, D>) {
        self.shapes.push(tensor.dims().to_vec());
    }
}

fn param_shapes<B: Backend, M: Module<B>>(module: &M) -> Vec<Vec<usize>> {
    let mut collector = ShapeCollector::default();
    module.visit(&mut collector);
    collector.shapes
}

/// Read a run configuration written by `save_config`
pub fn load_config(path: &Path) -> Result<TrainConfig> {
    let json = fs::read_to_string(path).with_context(|| {
        format!(
            "Cannot read config from '{}'. Pass --config or keep {CONFIG_FILE} \
             next to the checkpoint.",
            path.display()
        )
    })?;
    serde_json::from_str(&json)
        .with_context(|| format!("Invalid training config '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset_kind::DatasetKind;
    use crate::ml::model::GeneratorConfig;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_paths_follow_epoch_naming() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().join("out")).unwrap();
        assert!(ckpt.dir().is_dir());
        assert!(ckpt.generator_path(3).ends_with("netG_epoch_3.pth"));
        assert!(ckpt.discriminator_path(0).ends_with("netD_epoch_0.pth"));
    }

    #[test]
    fn test_generator_weights_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let device = Default::default();
        let cfg = GeneratorConfig::new(8, 4, 3, 16);

        let trained: Generator<TestBackend> = cfg.init(&device).unwrap();
        let path = dir.path().join("netG_epoch_0.pth");
        save_module::<TestBackend, _>(&trained, &path).unwrap();

        let fresh: Generator<TestBackend> = cfg.init(&device).unwrap();
        let restored = load_module(fresh, &path, &device).unwrap();

        let want = trained.output.weight.val().into_data().to_vec::<f32>().unwrap();
        let got  = restored.output.weight.val().into_data().to_vec::<f32>().unwrap();
        assert_eq!(want, got);
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let device = Default::default();
        let g: Generator<TestBackend> = GeneratorConfig::new(8, 4, 3, 16).init(&device).unwrap();
        assert!(load_module(g, &dir.path().join("none.pth"), &device).is_err());
    }

    #[test]
    fn test_same_size_but_different_shapes_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let device = Default::default();
        let path = dir.path().join("netG_epoch_0.pth");

        // Input conv [8,8,4,4] + output conv [4,3,4,4] against
        // [6,8,4,4] + [4,7,4,4]: same total, different shapes
        let saved: Generator<TestBackend> = GeneratorConfig::new(8, 4, 3, 16).init(&device).unwrap();
        save_module::<TestBackend, _>(&saved, &path).unwrap();

        let other: Generator<TestBackend> = GeneratorConfig::new(6, 4, 7, 16).init(&device).unwrap();
        assert_eq!(saved.num_params(), other.num_params());

        let err = load_module(other, &path, &device).err().unwrap();
        assert!(err.to_string().contains("does not fit"));
    }

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        let cfg = TrainConfig {
            dataset: DatasetKind::Mnist,
            nz: 42,
            ..TrainConfig::default()
        };
        ckpt.save_config(&cfg).unwrap();

        let back = load_config(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(back.dataset, DatasetKind::Mnist);
        assert_eq!(back.nz, 42);
    }
}
