pub mod client;
pub mod config;
pub mod error;
pub mod sse;
pub mod streaming;
pub mod traits;
pub mod types;

pub use client::{Chat, Client, ClientBuilder, Completions};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::StreamError;
pub use traits::ChatCompletions;

pub use streaming::{dispatch_stream, ChunkStream, CompletionChunk, StreamCallbacks};
pub use types::{
    ChatMessage, CompletionResponse, CreateCompletionOptions, Model, ModelResponse, Role, Usage,
};
