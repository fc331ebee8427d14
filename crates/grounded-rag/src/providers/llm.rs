//! Completion provider trait for answer generation

use async_trait::async_trait;

use crate::error::Result;

/// Trait for single-shot text completion
///
/// Implementations:
/// - `OpenAiClient`: OpenAI-compatible `/chat/completions` (DeepSeek by default)
/// - `OllamaClient`: local Ollama `/api/generate`
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete a fully built prompt and return the generated text
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
