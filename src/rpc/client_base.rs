//! Proxy Base: the plumbing shared by every generated proxy.
//!
//! Each call goes through the same steps:
//! 1. fail with `ResourceNoLongerAvailable` if the proxy was invalidated,
//! 2. merge the proxy's default metadata with the caller's,
//! 3. encode the request (which carries the bound resource name),
//! 4. hand it to the peer with the caller's timeout, untouched,
//! 5. decode the response or lift the failure into a [`ResourceError`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;

use super::messages::{
    DoCommandRequest, DoCommandResponse, GetGeometriesResponse, IsMovingRequest, IsMovingResponse,
    NameRequest,
};
use super::stream::ProxyStream;
use crate::codec;
use crate::common::{Geometry, Kinematics};
use crate::error::{ResourceError, Result};
use crate::peer::{CallRequest, PeerConnection};
use crate::resource::{
    CallOptions, Metadata, ResourceName, Struct, DO_COMMAND, GET_GEOMETRIES, GET_KINEMATICS,
};

// ---------------------------------------------------------------------------
// ProxyLifecycle
// ---------------------------------------------------------------------------

/// The two states of a proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyState {
    Bound,
    Invalid,
}

/// Shared state flag of one proxy and all its clones.
///
/// `Bound -> Invalid` is the only transition. Open streams wait on
/// [`ProxyLifecycle::invalidated`] so they end as soon as it happens.
#[derive(Debug)]
pub struct ProxyLifecycle {
    invalid: watch::Sender<bool>,
}

impl Default for ProxyLifecycle {
    fn default() -> Self {
        Self {
            invalid: watch::channel(false).0,
        }
    }
}

impl ProxyLifecycle {
    /// A lifecycle in the `Bound` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> ProxyState {
        if *self.invalid.borrow() {
            ProxyState::Invalid
        } else {
            ProxyState::Bound
        }
    }

    /// Whether calls are still allowed.
    pub fn is_bound(&self) -> bool {
        self.state() == ProxyState::Bound
    }

    /// Returns `true` if this call performed the transition.
    pub fn invalidate(&self) -> bool {
        self.invalid.send_if_modified(|invalid| {
            if *invalid {
                false
            } else {
                *invalid = true;
                true
            }
        })
    }

    /// Resolves once the lifecycle is `Invalid`. Does not borrow `self`.
    pub fn invalidated(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.invalid.subscribe();
        async move {
            // Err means the lifecycle itself is gone; nothing is left to wait for.
            let _ = rx.wait_for(|invalid| *invalid).await;
        }
    }
}

// ---------------------------------------------------------------------------
// ProxyBase
// ---------------------------------------------------------------------------

/// A resource name bound to a peer, plus the call plumbing.
#[derive(Clone)]
pub struct ProxyBase {
    name: ResourceName,
    service: String,
    peer: Arc<dyn PeerConnection>,
    default_metadata: Metadata,
    lifecycle: Arc<ProxyLifecycle>,
}

impl ProxyBase {
    /// Bind `name` on `peer`, addressing calls to `service`.
    pub fn new(name: ResourceName, service: impl Into<String>, peer: Arc<dyn PeerConnection>) -> Self {
        Self {
            name,
            service: service.into(),
            peer,
            default_metadata: Metadata::new(),
            lifecycle: Arc::new(ProxyLifecycle::new()),
        }
    }

    /// Metadata attached to every call unless the caller overrides a key.
    pub fn with_default_metadata(mut self, metadata: Metadata) -> Self {
        self.default_metadata = metadata;
        self
    }

    /// The bound resource.
    pub fn resource_name(&self) -> &ResourceName {
        &self.name
    }

    /// Fully-qualified RPC service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The connection calls go through.
    pub fn peer(&self) -> &Arc<dyn PeerConnection> {
        &self.peer
    }

    /// Metadata attached to every call.
    pub fn default_metadata(&self) -> &Metadata {
        &self.default_metadata
    }

    /// Lifecycle shared with every clone of this proxy.
    pub fn lifecycle(&self) -> &Arc<ProxyLifecycle> {
        &self.lifecycle
    }

    /// Current state, shared with every clone.
    pub fn state(&self) -> ProxyState {
        self.lifecycle.state()
    }

    /// Mark the proxy (and every clone sharing its lifecycle) invalid.
    pub fn invalidate(&self) {
        if self.lifecycle.invalidate() {
            tracing::debug!(resource = %self.name, "proxy invalidated");
        }
    }

    /// Effective metadata for one call.
    pub fn metadata_for(&self, opts: &CallOptions) -> Metadata {
        self.default_metadata.merged(&opts.metadata)
    }

    /// The request body for methods that take only the name and `extra`.
    pub fn name_request<'a>(&'a self, opts: &'a CallOptions) -> NameRequest<'a> {
        NameRequest {
            name: self.name.name(),
            extra: opts.extra.as_ref(),
        }
    }

    fn ensure_bound(&self) -> Result<()> {
        match self.state() {
            ProxyState::Bound => Ok(()),
            ProxyState::Invalid => Err(ResourceError::ResourceNoLongerAvailable(self.name.clone())),
        }
    }

    fn prepare<Req: Serialize>(&self, method: &str, request: &Req, opts: &CallOptions) -> Result<CallRequest> {
        self.ensure_bound()?;
        Ok(CallRequest {
            service: self.service.clone(),
            method: method.to_string(),
            payload: codec::encode(request)?,
            metadata: self.metadata_for(opts),
            timeout: opts.timeout,
        })
    }

    /// Issue a unary call and decode its response.
    pub async fn unary<Req, Resp>(&self, method: &str, request: &Req, opts: &CallOptions) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let call = self.prepare(method, request, opts)?;
        tracing::trace!(resource = %self.name, method, "unary call");
        let payload = self
            .peer
            .unary_call(call)
            .await
            .map_err(|e| e.into_resource_error(method))?;
        codec::decode(&payload)
    }

    /// Issue a unary call whose response carries nothing.
    pub async fn unary_void<Req>(&self, method: &str, request: &Req, opts: &CallOptions) -> Result<()>
    where
        Req: Serialize + Sync,
    {
        let call = self.prepare(method, request, opts)?;
        tracing::trace!(resource = %self.name, method, "unary call");
        self.peer
            .unary_call(call)
            .await
            .map(|_| ())
            .map_err(|e| e.into_resource_error(method))
    }

    /// Open a server-streaming call. Nothing is received until the returned
    /// stream is polled; dropping it cancels the call.
    pub async fn server_stream<Req, Resp>(
        &self,
        method: &'static str,
        request: &Req,
        opts: &CallOptions,
    ) -> Result<ProxyStream<Resp>>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let call = self.prepare(method, request, opts)?;
        tracing::trace!(resource = %self.name, method, "streaming call");
        let inner = self
            .peer
            .stream_call(call)
            .await
            .map_err(|e| e.into_resource_error(method))?;
        Ok(ProxyStream::new(
            method,
            self.name.clone(),
            inner,
            self.lifecycle.clone(),
        ))
    }

    // -- Operations common to every capability ------------------------------

    /// Forward a free-form command and return the resource's reply.
    pub async fn do_command(&self, command: Struct, opts: &CallOptions) -> Result<Struct> {
        let request = DoCommandRequest {
            name: self.name.name(),
            command: &command,
        };
        let response: DoCommandResponse = self.unary(DO_COMMAND, &request, opts).await?;
        Ok(response.result)
    }

    /// Geometries of the bound component.
    pub async fn get_geometries(&self, opts: &CallOptions) -> Result<Vec<Geometry>> {
        let response: GetGeometriesResponse = self
            .unary(GET_GEOMETRIES, &self.name_request(opts), opts)
            .await?;
        Ok(response.geometries)
    }

    /// Kinematics file of the bound component.
    pub async fn get_kinematics(&self, opts: &CallOptions) -> Result<Kinematics> {
        self.unary(GET_KINEMATICS, &self.name_request(opts), opts).await
    }

    /// Shared by every actuator. The request carries the name only.
    pub async fn is_moving(&self, opts: &CallOptions) -> Result<bool> {
        let request = IsMovingRequest {
            name: self.name.name(),
        };
        let response: IsMovingResponse = self.unary("is_moving", &request, opts).await?;
        Ok(response.is_moving)
    }
}

impl fmt::Debug for ProxyBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyBase")
            .field("name", &self.name)
            .field("service", &self.service)
            .field("default_metadata", &self.default_metadata)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
