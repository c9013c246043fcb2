//! Value objects representing immutable domain concepts.

pub mod verification_outcome;

// Re-export commonly used types
pub use verification_outcome::{VerificationOutcome, GENERIC_FAILURE_MESSAGE};
