// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits describing what the trainer works
// with: which dataset is selected and how images are read from it.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// The supported dataset names and their properties
pub mod dataset_kind;

// Core abstractions (traits) that other layers implement
pub mod traits;
