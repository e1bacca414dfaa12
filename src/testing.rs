//! In-memory peer used by the unit tests.
//!
//! `MockPeer` records every outgoing call, answers from scripted responses,
//! lists a configurable resource graph and publishes lifecycle events.
//! Streaming responses are produced by a background task through a bounded
//! channel, so a consumer that stops reading is observed as a cancellation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, watch};

use crate::error::CallError;
use crate::peer::{CallRequest, PeerConnection, ResourceEvent, ResponseStream};
use crate::resource::ResourceName;

pub(crate) struct MockPeer {
    resources: Mutex<Vec<ResourceName>>,
    calls: Mutex<Vec<CallRequest>>,
    responses: Mutex<HashMap<String, Result<Value, CallError>>>,
    streams: Mutex<HashMap<String, Vec<Value>>>,
    lookups: AtomicUsize,
    produced: Arc<AtomicUsize>,
    cancellations: Arc<watch::Sender<usize>>,
    events: broadcast::Sender<ResourceEvent>,
}

impl MockPeer {
    pub(crate) fn new() -> Self {
        let (cancellations, _) = watch::channel(0);
        let (events, _) = broadcast::channel(16);
        Self {
            resources: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(HashMap::new()),
            streams: Mutex::new(HashMap::new()),
            lookups: AtomicUsize::new(0),
            produced: Arc::new(AtomicUsize::new(0)),
            cancellations: Arc::new(cancellations),
            events,
        }
    }

    pub(crate) fn add_resource(&self, name: ResourceName) {
        self.resources.lock().push(name);
    }

    pub(crate) fn remove_resource(&self, name: &ResourceName) {
        self.resources.lock().retain(|r| r != name);
    }

    /// Answer every unary call to `method` with `body`.
    pub(crate) fn respond(&self, method: &str, body: Value) {
        self.responses.lock().insert(method.to_string(), Ok(body));
    }

    /// Fail every unary call to `method` with `err`.
    pub(crate) fn fail(&self, method: &str, err: CallError) {
        self.responses.lock().insert(method.to_string(), Err(err));
    }

    /// Answer streaming calls to `method` with `items`, one at a time.
    pub(crate) fn stream(&self, method: &str, items: Vec<Value>) {
        self.streams.lock().insert(method.to_string(), items);
    }

    pub(crate) fn publish(&self, event: ResourceEvent) {
        let _ = self.events.send(event);
    }

    pub(crate) fn calls(&self) -> Vec<CallRequest> {
        self.calls.lock().clone()
    }

    /// Decoded body of the most recent call.
    pub(crate) fn last_request_body(&self) -> Value {
        self.calls
            .lock()
            .last()
            .map(|c| serde_json::from_slice(&c.payload).unwrap())
            .unwrap_or(Value::Null)
    }

    pub(crate) fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Stream items accepted by consumers' channels so far.
    pub(crate) fn produced(&self) -> usize {
        self.produced.load(Ordering::SeqCst)
    }

    pub(crate) fn cancellations(&self) -> usize {
        *self.cancellations.borrow()
    }

    /// Wait until some streaming call has been cancelled by its consumer.
    pub(crate) async fn wait_for_cancellation(&self) {
        let mut rx = self.cancellations.subscribe();
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|n| *n > 0))
            .await
            .expect("stream was never cancelled")
            .expect("cancellation channel closed");
    }
}

#[async_trait]
impl PeerConnection for MockPeer {
    async fn unary_call(&self, call: CallRequest) -> Result<Bytes, CallError> {
        let method = call.method.clone();
        self.calls.lock().push(call);
        let scripted = self.responses.lock().get(&method).cloned();
        match scripted {
            Some(Ok(body)) => Ok(Bytes::from(serde_json::to_vec(&body).unwrap())),
            Some(Err(err)) => Err(err),
            None => Err(CallError::Status {
                code: 12,
                message: format!("unimplemented method {}", method),
            }),
        }
    }

    async fn stream_call(&self, call: CallRequest) -> Result<ResponseStream, CallError> {
        let method = call.method.clone();
        self.calls.lock().push(call);
        let items = self.streams.lock().get(&method).cloned().ok_or_else(|| CallError::Status {
            code: 12,
            message: format!("unimplemented method {}", method),
        })?;

        let (tx, rx) = mpsc::channel::<Result<Bytes, CallError>>(1);
        let cancellations = self.cancellations.clone();
        let produced = self.produced.clone();
        tokio::spawn(async move {
            for item in items {
                let payload = Bytes::from(serde_json::to_vec(&item).unwrap());
                if tx.send(Ok(payload)).await.is_err() {
                    cancellations.send_modify(|n| *n += 1);
                    return;
                }
                produced.fetch_add(1, Ordering::SeqCst);
            }
        });

        Ok(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })
        .boxed())
    }

    async fn resource_names(&self) -> Result<Vec<ResourceName>, CallError> {
        Ok(self.resources.lock().clone())
    }

    async fn find(&self, name: &str) -> Result<Option<ResourceName>, CallError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .resources
            .lock()
            .iter()
            .find(|r| r.name() == name)
            .cloned())
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<ResourceEvent>> {
        Some(self.events.subscribe())
    }
}
