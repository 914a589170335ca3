use futures::Stream;

use super::CompletionChunk;
use crate::error::{BoxError, StreamError};
use crate::sse::{BodyReader, EventFrameParser, Frame, LineAssembler};

/// Why a chunk sequence stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Termination {
    Sentinel,
    EndOfStream,
}

/// Shared read/decode/parse loop behind both the callback and the stream APIs.
///
/// Yields one `Ok(chunk)` per data frame in wire order. Ends after `[DONE]` or
/// when the body is exhausted. A transport failure is yielded once as
/// `Err(StreamError::Transport)` and ends the sequence. Malformed payloads are
/// logged and skipped. The body reader is released on every exit path,
/// including when the returned stream is dropped before completion.
pub(crate) fn chunk_events<S, B, E>(
    body: S,
) -> impl Stream<Item = Result<CompletionChunk, StreamError>> + Send + 'static
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    async_stream::stream! {
        let mut reader = BodyReader::acquire(body);
        let mut lines = LineAssembler::new();
        let parser = EventFrameParser::new();
        let mut dropped = 0usize;
        let mut delivered = 0usize;

        tracing::debug!("chat completion stream started");

        let termination = 'read: loop {
            let segment = match reader.read().await {
                Some(Ok(segment)) => segment,
                Some(Err(e)) => {
                    reader.release();
                    let err = StreamError::transport(e);
                    tracing::warn!(error = %err, delivered, "chat completion stream failed");
                    yield Err(err);
                    return;
                }
                None => break 'read Termination::EndOfStream,
            };

            let complete = lines.feed(segment.as_ref());
            drop(segment);

            for line in complete {
                match parser.parse(&line) {
                    Frame::Skip => {}
                    Frame::Done => break 'read Termination::Sentinel,
                    Frame::Event(chunk) => {
                        delivered += 1;
                        yield Ok(chunk);
                    }
                    Frame::Malformed(e) => {
                        dropped += 1;
                        tracing::warn!(error = %e, line = %line, "Failed to parse chunk");
                    }
                }
            }
        };

        if termination == Termination::EndOfStream {
            if let Some(line) = lines.flush() {
                match parser.parse(&line) {
                    Frame::Event(chunk) => {
                        delivered += 1;
                        yield Ok(chunk);
                    }
                    Frame::Malformed(e) => {
                        dropped += 1;
                        tracing::warn!(error = %e, line = %line, "Failed to parse chunk");
                    }
                    Frame::Skip | Frame::Done => {}
                }
            }
        }

        reader.release();
        tracing::debug!(?termination, delivered, dropped, "chat completion stream finished");
    }
}
