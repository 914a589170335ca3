use anyhow::Result;
use async_trait::async_trait;

use crate::streaming::{ChunkStream, StreamCallbacks};
use crate::types::{CompletionResponse, CreateCompletionOptions};

/// Trait for chat completion backends
///
/// Provides the complete response plus both streaming consumption models:
/// callbacks pushed from inside the decoder, or a stream pulled by the caller.
#[async_trait]
pub trait ChatCompletions: Send + Sync {
    /// Non-streaming chat completion
    async fn create(&self, options: CreateCompletionOptions) -> Result<CompletionResponse>;

    /// Streaming chat completion delivered through callbacks
    async fn create_stream(
        &self,
        options: CreateCompletionOptions,
        callbacks: Option<StreamCallbacks<'_>>,
    ) -> Result<()>;

    /// Streaming chat completion delivered as a [`ChunkStream`]
    async fn create_iterator(&self, options: CreateCompletionOptions) -> Result<ChunkStream>;
}
