// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: no tensor math and no file formats
// (those live in Layers 4, 5 and 6).
//
// Reference: Clean Architecture pattern

// The training workflow
pub mod train_use_case;

// Sampling from a trained generator
pub mod generate_use_case;
