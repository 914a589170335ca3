use futures::{Stream, StreamExt};
use std::pin::Pin;

/// Exclusive handle on a response body for the lifetime of one stream session
///
/// The body is released exactly once: either through [`BodyReader::release`]
/// or when the reader is dropped, whichever happens first. After release no
/// further segments are read.
pub struct BodyReader<S> {
    inner: Option<Pin<Box<S>>>,
}

impl<S> BodyReader<S>
where
    S: Stream,
{
    pub fn acquire(body: S) -> Self {
        tracing::trace!("acquired response body reader");
        Self {
            inner: Some(Box::pin(body)),
        }
    }

    /// Read the next segment. Returns `None` once the body is exhausted or released.
    pub async fn read(&mut self) -> Option<S::Item> {
        match self.inner.as_mut() {
            Some(body) => body.next().await,
            None => None,
        }
    }

    pub fn release(&mut self) {
        if self.inner.take().is_some() {
            tracing::trace!("released response body reader");
        }
    }

    pub fn is_released(&self) -> bool {
        self.inner.is_none()
    }
}

impl<S> Drop for BodyReader<S> {
    fn drop(&mut self) {
        if self.inner.take().is_some() {
            tracing::trace!("released response body reader on drop");
        }
    }
}
