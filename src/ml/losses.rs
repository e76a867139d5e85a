// ============================================================
// Layer 5 — Adversarial Losses
// ============================================================
// Binary cross-entropy computed on logits:
//
//   BCE(x, y) = max(x, 0) - x·y + ln(1 + e^-|x|)
//
// which equals -[y·ln σ(x) + (1-y)·ln(1-σ(x))] but never takes the
// log of a saturated sigmoid.
//
//   Discriminator: BCE(D(x), 1) + BCE(D(G(z)), 0)
//   Generator:     BCE(D(G(z)), 1)   (non-saturating loss)

use burn::{prelude::*, tensor::activation::sigmoid};

pub const REAL_LABEL: f32 = 1.0;
pub const FAKE_LABEL: f32 = 0.0;

/// Mean BCE of `logits` against a constant `target` label
pub fn bce_with_logits<B: Backend>(logits: Tensor<B, 1>, target: f32) -> Tensor<B, 1> {
    let positive = logits.clone().clamp_min(0.0);
    let softplus = logits.clone().abs().neg().exp().log1p();
    (positive - logits.mul_scalar(target) + softplus).mean()
}

/// Mean probability the discriminator assigns to "real": D(x) or D(G(z))
pub fn mean_probability<B: Backend>(logits: Tensor<B, 1>) -> f64 {
    sigmoid(logits).mean().into_scalar().elem::<f64>()
}

pub fn scalar<B: Backend>(loss: Tensor<B, 1>) -> f64 {
    loss.into_scalar().elem::<f64>()
}
