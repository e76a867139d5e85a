// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All network, loss and training-loop code. Generic over the Burn
// backend; the concrete backend (WGPU with --cuda, ndarray
// otherwise) is picked in trainer.rs and sampler.rs only.
//
//   model.rs   — DCGAN generator (transposed convolutions) and
//                discriminator (strided convolutions)
//   losses.rs  — binary cross-entropy on logits, D(x) readout
//   trainer.rs — alternating D / G updates, samples, checkpoints
//   sampler.rs — render images from a saved generator
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Radford et al. (2016) Unsupervised Representation
//            Learning with Deep Convolutional GANs

/// Generator and discriminator architectures
pub mod model;

/// Adversarial loss functions
pub mod losses;

/// Training loop with sampling and checkpointing
pub mod trainer;

/// Image generation from a checkpoint
pub mod sampler;
