//! Language-model collaborator seam.
//!
//! The pipeline only ever sees [`TextCompletion`]; every call through it
//! is treated as fallible and backed by a deterministic fallback. A
//! blocking Gemini implementation ships behind the `gemini` feature.

pub mod prompts;

#[cfg(feature = "gemini")]
pub mod client;
#[cfg(feature = "gemini")]
pub mod types;

#[cfg(feature = "gemini")]
pub use client::GeminiClient;

use crate::error::Result;

/// Opaque prompt-in, text-out completion contract.
pub trait TextCompletion: Send + Sync {
    fn complete(&self, prompt: &str, model: &str) -> Result<String>;
}

/// Closures double as completion backends, which keeps tests and demos
/// free of wrapper structs.
impl<F> TextCompletion for F
where
    F: Fn(&str, &str) -> Result<String> + Send + Sync,
{
    fn complete(&self, prompt: &str, model: &str) -> Result<String> {
        self(prompt, model)
    }
}
