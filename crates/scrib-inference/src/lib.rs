//! # scrib-inference
//!
//! Text-generation backend abstraction for scrib.
//!
//! The API server talks to generation models only through the
//! [`scrib_core::GenerationBackend`] trait; this crate supplies the
//! Gemini implementation used by the passthrough endpoint.

pub mod gemini;

pub use gemini::{GeminiBackend, DEFAULT_GEMINI_URL, DEFAULT_GEN_MODEL, DEFAULT_TEMPERATURE};

// Re-export core types
pub use scrib_core::{Error, GenerationBackend, Result};
