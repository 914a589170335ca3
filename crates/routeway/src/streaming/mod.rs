//! Incremental decoding of streamed chat completions.
//!
//! The response body is read segment by segment, decoded into lines and
//! parsed into [`CompletionChunk`]s by a single shared loop. Two thin
//! adapters sit on top of it:
//!
//! - [`dispatch_stream`] pushes every chunk to [`StreamCallbacks`]
//! - [`ChunkStream`] hands chunks out on demand as a [`futures::Stream`]

mod callbacks;
mod chunk;
mod events;
mod iterator;

pub use callbacks::{dispatch_stream, StreamCallbacks};
pub use chunk::{ChunkChoice, CompletionChunk, Delta, FunctionDelta, Nullable, ToolCallDelta};
pub use iterator::ChunkStream;
