//! # Peer Connection
//!
//! The contract this crate requires from an established channel to a remote
//! controller. Transport, authentication and multiplexing live behind it; the
//! framework only issues calls and reads the peer's resource listing.
//!
//! Implementations must be safe to call concurrently: several proxies, and
//! several calls on one proxy, share a single connection without any
//! call-level locking on this side.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use tokio::sync::broadcast;

use crate::error::CallError;
use crate::resource::{Metadata, ResourceName};

/// Lazily produced responses of one server-streaming call.
///
/// Dropping the stream must cancel the call on the peer.
pub type ResponseStream = BoxStream<'static, Result<Bytes, CallError>>;

/// One outgoing call, fully prepared by a proxy.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRequest {
    /// Fully-qualified RPC service name.
    pub service: String,
    pub method: String,
    /// Encoded request, already carrying the target resource's name.
    pub payload: Bytes,
    /// Effective metadata, attached unmodified.
    pub metadata: Metadata,
    /// `None` means "use the connection's default".
    pub timeout: Option<Duration>,
}

/// Lifecycle notifications the peer publishes about its resource graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceEvent {
    /// The resource is gone; proxies bound to it become invalid.
    Removed(ResourceName),
    /// The resource was reconfigured in place and keeps its name and
    /// capability. Proxies stay bound.
    Reconfigured(ResourceName),
}

impl ResourceEvent {
    /// The resource the event is about.
    pub fn resource_name(&self) -> &ResourceName {
        match self {
            ResourceEvent::Removed(name) | ResourceEvent::Reconfigured(name) => name,
        }
    }
}

#[async_trait]
pub trait PeerConnection: Send + Sync {
    /// One request, one response.
    async fn unary_call(&self, call: CallRequest) -> Result<Bytes, CallError>;

    /// One request, a sequence of responses.
    async fn stream_call(&self, call: CallRequest) -> Result<ResponseStream, CallError>;

    /// Every resource the peer currently exposes.
    async fn resource_names(&self) -> Result<Vec<ResourceName>, CallError>;

    /// The resource registered under `name`, if any.
    async fn find(&self, name: &str) -> Result<Option<ResourceName>, CallError> {
        Ok(self
            .resource_names()
            .await?
            .into_iter()
            .find(|r| r.name() == name))
    }

    /// Subscribe to resource lifecycle events. Peers that never publish
    /// events return `None`.
    fn subscribe(&self) -> Option<broadcast::Receiver<ResourceEvent>> {
        None
    }
}
