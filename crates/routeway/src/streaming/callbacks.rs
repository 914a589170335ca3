use futures::{Stream, StreamExt};

use super::events::chunk_events;
use super::CompletionChunk;
use crate::error::{BoxError, StreamError};

type ChunkFn<'a> = Box<dyn FnMut(&CompletionChunk) + Send + 'a>;
type TextFn<'a> = Box<dyn FnMut(&str) + Send + 'a>;
type ErrorFn<'a> = Box<dyn FnMut(&StreamError) + Send + 'a>;
type DoneFn<'a> = Box<dyn FnMut() + Send + 'a>;

/// Handlers invoked while a streamed completion is decoded
///
/// Every handler is optional. Closures may borrow from the caller's scope for
/// the duration of the stream.
#[derive(Default)]
pub struct StreamCallbacks<'a> {
    on_chunk: Option<ChunkFn<'a>>,
    on_content: Option<TextFn<'a>>,
    on_reasoning: Option<TextFn<'a>>,
    on_error: Option<ErrorFn<'a>>,
    on_done: Option<DoneFn<'a>>,
}

impl<'a> StreamCallbacks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with every decoded chunk
    pub fn on_chunk(mut self, f: impl FnMut(&CompletionChunk) + Send + 'a) -> Self {
        self.on_chunk = Some(Box::new(f));
        self
    }

    /// Called with `choices[0].delta.content` when present
    pub fn on_content(mut self, f: impl FnMut(&str) + Send + 'a) -> Self {
        self.on_content = Some(Box::new(f));
        self
    }

    /// Called with `choices[0].delta.reasoning_content` when present
    pub fn on_reasoning(mut self, f: impl FnMut(&str) + Send + 'a) -> Self {
        self.on_reasoning = Some(Box::new(f));
        self
    }

    /// Called once if reading the body fails, before the error is returned
    pub fn on_error(mut self, f: impl FnMut(&StreamError) + Send + 'a) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Called once after `[DONE]` or a clean end of the body
    pub fn on_done(mut self, f: impl FnMut() + Send + 'a) -> Self {
        self.on_done = Some(Box::new(f));
        self
    }

    fn emit_chunk(&mut self, chunk: &CompletionChunk) {
        if let Some(f) = self.on_chunk.as_mut() {
            f(chunk);
        }

        if let Some(content) = chunk.content() {
            if let Some(f) = self.on_content.as_mut() {
                f(content);
            }
        }

        if let Some(reasoning) = chunk.reasoning_content() {
            if let Some(f) = self.on_reasoning.as_mut() {
                f(reasoning);
            }
        }
    }

    fn emit_error(&mut self, err: &StreamError) {
        if let Some(f) = self.on_error.as_mut() {
            f(err);
        }
    }

    fn emit_done(&mut self) {
        if let Some(f) = self.on_done.as_mut() {
            f();
        }
    }
}

impl std::fmt::Debug for StreamCallbacks<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamCallbacks")
            .field("on_chunk", &self.on_chunk.is_some())
            .field("on_content", &self.on_content.is_some())
            .field("on_reasoning", &self.on_reasoning.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_done", &self.on_done.is_some())
            .finish()
    }
}

/// Decode a streamed completion body, pushing every event to `callbacks`.
///
/// Fails before reading anything when there is no body or no callbacks. On a
/// transport failure `on_error` runs and the same error is returned; `on_done`
/// is not called in that case.
pub async fn dispatch_stream<S, B, E>(
    body: Option<S>,
    callbacks: Option<StreamCallbacks<'_>>,
) -> Result<(), StreamError>
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    let body = body.ok_or(StreamError::MissingBody)?;
    let mut callbacks = callbacks.ok_or(StreamError::MissingCallbacks)?;

    let mut events = Box::pin(chunk_events(body));

    while let Some(event) = events.next().await {
        match event {
            Ok(chunk) => callbacks.emit_chunk(&chunk),
            Err(err) => {
                callbacks.emit_error(&err);
                return Err(err);
            }
        }
    }

    callbacks.emit_done();
    Ok(())
}
