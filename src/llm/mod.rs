//! Text-generation seam.
//!
//! The core hands a finished prompt to a [`TextGeneration`] backend and
//! gets back either the full reply or a stream of chunks. Chunks carry no
//! structure of their own — concatenating them in delivery order yields the
//! complete reply. Retry, backoff, and timeouts live inside the backend
//! implementation, not in the callers.

pub mod openai;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::errors::GenerationError;

pub use openai::OpenAiChat;

/// A stream of reply chunks.
pub type ChunkStream = BoxStream<'static, Result<String, GenerationError>>;

/// Single-turn text generation.
#[async_trait]
pub trait TextGeneration: Send + Sync {
    /// Generate the full reply for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Generate a streaming reply for `prompt`.
    ///
    /// The default implementation degrades to one chunk containing the
    /// whole reply.
    async fn generate_stream(&self, prompt: &str) -> Result<ChunkStream, GenerationError> {
        let full = self.generate(prompt).await?;
        Ok(Box::pin(futures::stream::once(async move { Ok(full) })))
    }
}
