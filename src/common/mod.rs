//! Utilities shared across part decoders.

// Submodule declarations
pub mod binary;

// Re-exports for convenience
pub use binary::{BinaryError, FieldReader};
