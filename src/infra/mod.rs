// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything the trainer writes to disk:
//
//   checkpoint.rs — netG/netD weights per epoch and the run
//                   config (train_config.json), plus loading
//                   them back for resuming and sampling
//
//   metrics.rs    — per-epoch loss / D(x) averages in metrics.csv
//
//   image_grid.rs — real_samples.png / fake_samples.png grids
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

/// Sample sheet rendering
pub mod image_grid;
