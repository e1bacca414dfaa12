//! Typed view over a server-streaming call.

use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::{BoxFuture, Fuse};
use futures::{FutureExt, Stream, StreamExt};
use serde::de::DeserializeOwned;

use super::client_base::ProxyLifecycle;
use crate::codec;
use crate::error::{ResourceError, Result};
use crate::peer::ResponseStream;
use crate::resource::ResourceName;

/// Decoded responses of one streaming call.
///
/// Each poll waits until the peer emits the next message or closes the
/// stream. Dropping a `ProxyStream` drops the underlying call, which the
/// peer connection turns into a cancellation. Calling the method again opens
/// a fresh stream.
///
/// If the proxy is invalidated while the stream is open, the stream yields
/// `ResourceNoLongerAvailable`, releases the call and ends. A consumer
/// waiting on the peer is woken for this.
pub struct ProxyStream<T> {
    method: &'static str,
    name: ResourceName,
    inner: Option<ResponseStream>,
    lifecycle: Arc<ProxyLifecycle>,
    invalidated: Fuse<BoxFuture<'static, ()>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ProxyStream<T> {
    pub(crate) fn new(
        method: &'static str,
        name: ResourceName,
        inner: ResponseStream,
        lifecycle: Arc<ProxyLifecycle>,
    ) -> Self {
        Self {
            method,
            name,
            inner: Some(inner),
            invalidated: lifecycle.invalidated().boxed().fuse(),
            lifecycle,
            _marker: PhantomData,
        }
    }

    /// Name of the streaming method.
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Whether the underlying call is still held.
    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    fn close_invalid(&mut self) -> Poll<Option<Result<T>>> {
        self.inner = None;
        Poll::Ready(Some(Err(ResourceError::ResourceNoLongerAvailable(
            self.name.clone(),
        ))))
    }
}

impl<T: DeserializeOwned> Stream for ProxyStream<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.inner.is_none() {
            return Poll::Ready(None);
        }
        if !self.lifecycle.is_bound() {
            return self.close_invalid();
        }

        let method = self.method;
        let polled = match self.inner.as_mut() {
            Some(inner) => inner.poll_next_unpin(cx),
            None => return Poll::Ready(None),
        };
        match polled {
            Poll::Pending => match self.invalidated.poll_unpin(cx) {
                Poll::Ready(()) if !self.lifecycle.is_bound() => self.close_invalid(),
                _ => Poll::Pending,
            },
            Poll::Ready(None) => {
                self.inner = None;
                Poll::Ready(None)
            }
            Poll::Ready(Some(Ok(payload))) => Poll::Ready(Some(codec::decode(&payload))),
            Poll::Ready(Some(Err(err))) => Poll::Ready(Some(Err(err.into_resource_error(method)))),
        }
    }
}
