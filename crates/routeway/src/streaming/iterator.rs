use futures::stream::FusedStream;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};

use super::events::chunk_events;
use super::CompletionChunk;
use crate::error::{BoxError, StreamError};

type ChunkResults = Pin<Box<dyn Stream<Item = Result<CompletionChunk, StreamError>> + Send>>;

/// Lazily decoded chunks of one streamed completion
///
/// A single pass over one response body: once it has ended (after `[DONE]`,
/// the end of the body, or a terminal transport error) it keeps returning
/// `None` and never touches the transport again. Dropping it early releases
/// the body.
pub struct ChunkStream {
    inner: Option<ChunkResults>,
}

impl ChunkStream {
    /// Start decoding `body`; fails if the response has no body
    pub fn new<S, B, E>(body: Option<S>) -> Result<Self, StreamError>
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        let body = body.ok_or(StreamError::MissingBody)?;
        Ok(Self {
            inner: Some(Box::pin(chunk_events(body))),
        })
    }

    /// Drain the stream, concatenating every content delta
    pub async fn collect_content(mut self) -> Result<String, StreamError> {
        let mut text = String::new();
        while let Some(chunk) = self.next().await {
            if let Some(content) = chunk?.content() {
                text.push_str(content);
            }
        }
        Ok(text)
    }
}

impl Stream for ChunkStream {
    type Item = Result<CompletionChunk, StreamError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let Some(inner) = self.inner.as_mut() else {
            return Poll::Ready(None);
        };

        match inner.as_mut().poll_next(cx) {
            Poll::Ready(None) => {
                // Drop the decoder (and with it the body) as soon as we are done
                self.inner = None;
                Poll::Ready(None)
            }
            Poll::Ready(Some(Err(err))) => {
                self.inner = None;
                Poll::Ready(Some(Err(err)))
            }
            other => other,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            Some(inner) => (0, inner.size_hint().1),
            None => (0, Some(0)),
        }
    }
}

impl FusedStream for ChunkStream {
    fn is_terminated(&self) -> bool {
        self.inner.is_none()
    }
}

impl std::fmt::Debug for ChunkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkStream")
            .field("terminated", &self.is_terminated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    type Body = futures::stream::Iter<std::vec::IntoIter<Result<Vec<u8>, io::Error>>>;

    fn body(segments: Vec<Result<Vec<u8>, io::Error>>) -> Option<Body> {
        Some(futures::stream::iter(segments))
    }

    #[test]
    fn test_missing_body() {
        let result = ChunkStream::new::<Body, _, _>(None);
        assert!(matches!(result, Err(StreamError::MissingBody)));
    }

    #[tokio::test]
    async fn test_terminated_after_done() {
        let input = b"data: [DONE]\n".to_vec();
        let mut stream = ChunkStream::new(body(vec![Ok(input)])).unwrap();

        assert!(!stream.is_terminated());
        assert!(stream.next().await.is_none());
        assert!(stream.is_terminated());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_terminated_after_error() {
        let segments = vec![
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "eof")),
            Ok(b"data: [DONE]\n".to_vec()),
        ];
        let mut stream = ChunkStream::new(body(segments)).unwrap();

        assert!(matches!(stream.next().await, Some(Err(StreamError::Transport(_)))));
        assert!(stream.is_terminated());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_collect_content() {
        let input = concat!(
            r#"data: {"id":"1","object":"x","created":0,"model":"m","choices":[{"index":0,"delta":{"role":"assistant","content":"Hel"}}]}"#,
            "\n\n",
            r#"data: {"id":"1","object":"x","created":0,"model":"m","choices":[{"index":0,"delta":{"content":"lo"}}]}"#,
            "\n\ndata: [DONE]\n\n",
        );
        let stream = ChunkStream::new(body(vec![Ok(input.as_bytes().to_vec())])).unwrap();

        assert_eq!(stream.collect_content().await.unwrap(), "Hello");
    }
}
