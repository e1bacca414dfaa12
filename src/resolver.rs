//! Resource Resolver: turns a name on a connected peer into a typed proxy.
//!
//! ```text
//! resolve::<GripperClient>("g1")
//!   → Registry::registration(rdk:component:gripper)   UnknownCapability
//!   → PeerConnection::find("g1")                      ResourceNotFound
//!   → actual api == expected api?                     CapabilityMismatch
//!   → cached proxy, or GripperClient::from_base(...)
//! ```
//!
//! The descriptor comparison happens before any proxy exists, so calling a
//! camera method on a gripper is a resolution-time failure rather than a
//! downstream type error. The resolver never retries; every failure goes
//! straight back to the caller.
//!
//! Every proxy handed out is tracked by name, whether or not the cache is
//! enabled, so a `Removed` event reaches all of them.

use std::any::{Any, TypeId};
use std::sync::{Arc, Weak};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::error::{ResourceError, Result};
use crate::peer::{PeerConnection, ResourceEvent};
use crate::resource::{Api, Registry, Resource, ResourceName};
use crate::rpc::{ProxyBase, ProxyLifecycle, ResourceClient};

struct CachedProxy {
    proxy: Arc<dyn Any + Send + Sync>,
    lifecycle: Arc<ProxyLifecycle>,
}

/// Resolves resources on one peer against one registry.
pub struct Resolver {
    peer: Arc<dyn PeerConnection>,
    registry: Arc<Registry>,
    config: ClientConfig,
    cache: DashMap<(ResourceName, TypeId), CachedProxy>,
    issued: DashMap<ResourceName, Vec<Weak<ProxyLifecycle>>>,
}

impl Resolver {
    /// Resolver with the default configuration.
    pub fn new(peer: Arc<dyn PeerConnection>, registry: Arc<Registry>) -> Self {
        Self::with_config(peer, registry, ClientConfig::default())
    }

    /// Resolver with `config`. Events are not followed until [`Resolver::spawn_event_watcher`] is called.
    pub fn with_config(peer: Arc<dyn PeerConnection>, registry: Arc<Registry>, config: ClientConfig) -> Self {
        Self {
            peer,
            registry,
            config,
            cache: DashMap::new(),
            issued: DashMap::new(),
        }
    }

    /// Build a shared resolver and, if configured and supported by the peer,
    /// start following its resource events. Must be called inside a tokio
    /// runtime.
    pub fn connect(peer: Arc<dyn PeerConnection>, registry: Arc<Registry>, config: ClientConfig) -> Arc<Self> {
        let watch = config.watch_resource_events;
        let resolver = Arc::new(Self::with_config(peer, registry, config));
        if watch {
            resolver.spawn_event_watcher();
        }
        resolver
    }

    /// The connection proxies are bound to.
    pub fn peer(&self) -> &Arc<dyn PeerConnection> {
        &self.peer
    }

    /// The registry capabilities are looked up in.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve `name` as the capability implemented by proxy type `C`.
    pub async fn resolve<C>(&self, name: &str) -> Result<Arc<C>>
    where
        C: ResourceClient + Send + Sync,
    {
        let registration = self.registry.registration(&C::API)?;
        let resource_name = self.locate(name, &C::API).await?;
        let key = (resource_name.clone(), TypeId::of::<C>());

        Ok(self.issue(key, || {
            let base = self.proxy_base(resource_name, &registration.definition.service);
            let lifecycle = base.lifecycle().clone();
            (Arc::new(C::from_base(base)), lifecycle)
        }))
    }

    /// Resolve `name` as `api` without knowing the proxy type statically.
    /// The proxy is built by the constructor registered for `api`.
    pub async fn resolve_dyn(&self, name: &str, api: &Api) -> Result<Arc<dyn Resource>> {
        let registration = self.registry.registration(api)?;
        let resource_name = self.locate(name, api).await?;
        let key = (resource_name.clone(), TypeId::of::<dyn Resource>());

        let proxy = self.issue(key, || {
            let base = self.proxy_base(resource_name, &registration.definition.service);
            let lifecycle = base.lifecycle().clone();
            (Arc::new(registration.create_rpc_client(base)), lifecycle)
        });
        Ok((*proxy).clone())
    }

    /// Every resource the peer exposes.
    pub async fn resource_names(&self) -> Result<Vec<ResourceName>> {
        self.peer
            .resource_names()
            .await
            .map_err(|e| e.into_resource_error("resource_names"))
    }

    /// Apply one lifecycle event. Returns how many live proxies, cached or
    /// not, were invalidated.
    pub fn handle_event(&self, event: &ResourceEvent) -> usize {
        match event {
            ResourceEvent::Removed(name) => {
                let mut invalidated = 0;
                if let Some((_, lifecycles)) = self.issued.remove(name) {
                    for lifecycle in lifecycles.iter().filter_map(Weak::upgrade) {
                        if lifecycle.invalidate() {
                            invalidated += 1;
                        }
                    }
                }
                self.cache.retain(|(cached_name, _), _| cached_name != name);
                tracing::debug!(resource = %name, invalidated, "resource removed");
                invalidated
            }
            ResourceEvent::Reconfigured(name) => {
                tracing::debug!(resource = %name, "resource reconfigured");
                0
            }
        }
    }

    /// Follow the peer's resource events on a background task. Returns
    /// `None` if the peer publishes no events. The task ends when the peer
    /// closes its event channel or the resolver is dropped.
    pub fn spawn_event_watcher(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let mut events = self.peer.subscribe()?;
        let resolver: Weak<Self> = Arc::downgrade(self);
        Some(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => match resolver.upgrade() {
                        Some(resolver) => {
                            resolver.handle_event(&event);
                        }
                        None => break,
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "resource event watcher lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }))
    }

    /// Number of proxies currently cached.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    async fn locate(&self, name: &str, expected: &Api) -> Result<ResourceName> {
        let actual = self
            .peer
            .find(name)
            .await
            .map_err(|e| e.into_resource_error("find"))?
            .ok_or_else(|| ResourceError::ResourceNotFound(name.to_string()))?;

        if actual.api() != expected {
            return Err(ResourceError::CapabilityMismatch {
                name: name.to_string(),
                expected: expected.clone(),
                actual: actual.api().clone(),
            });
        }
        tracing::debug!(resource = %actual, "resolved resource");
        Ok(actual)
    }

    fn proxy_base(&self, name: ResourceName, service: &str) -> ProxyBase {
        ProxyBase::new(name, service, self.peer.clone())
            .with_default_metadata(self.config.default_metadata.clone())
    }

    /// The cached proxy for `key` if it is still bound, otherwise a new one
    /// from `build`. The lookup and the insert happen under one shard lock,
    /// so concurrent resolves of the same key share a proxy.
    fn issue<T>(
        &self,
        key: (ResourceName, TypeId),
        build: impl FnOnce() -> (Arc<T>, Arc<ProxyLifecycle>),
    ) -> Arc<T>
    where
        T: Any + Send + Sync,
    {
        if !self.config.cache_proxies {
            let (proxy, lifecycle) = build();
            self.track(&key.0, &lifecycle);
            return proxy;
        }

        match self.cache.entry(key) {
            Entry::Occupied(mut slot) => {
                if slot.get().lifecycle.is_bound() {
                    if let Ok(proxy) = slot.get().proxy.clone().downcast::<T>() {
                        tracing::trace!(resource = %slot.key().0, "reusing cached proxy");
                        return proxy;
                    }
                }
                let (proxy, lifecycle) = build();
                self.track(&slot.key().0, &lifecycle);
                slot.insert(CachedProxy {
                    proxy: proxy.clone(),
                    lifecycle,
                });
                proxy
            }
            Entry::Vacant(slot) => {
                let (proxy, lifecycle) = build();
                self.track(&slot.key().0, &lifecycle);
                slot.insert(CachedProxy {
                    proxy: proxy.clone(),
                    lifecycle,
                });
                proxy
            }
        }
    }

    fn track(&self, name: &ResourceName, lifecycle: &Arc<ProxyLifecycle>) {
        let mut lifecycles = self.issued.entry(name.clone()).or_default();
        lifecycles.retain(|weak| weak.strong_count() > 0);
        lifecycles.push(Arc::downgrade(lifecycle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::camera::{self, Camera, CameraClient};
    use crate::components::gripper::{self, Gripper, GripperClient};
    use crate::components::register_builtins;
    use crate::resource::{CallOptions, Metadata};
    use crate::testing::MockPeer;
    use serde_json::json;
    use std::time::Duration;

    fn registry() -> Arc<Registry> {
        let registry = Arc::new(Registry::new());
        register_builtins(&registry).unwrap();
        registry
    }

    fn peer_with(names: &[ResourceName]) -> Arc<MockPeer> {
        let peer = MockPeer::new();
        for name in names {
            peer.add_resource(name.clone());
        }
        Arc::new(peer)
    }

    #[tokio::test]
    async fn test_resolve_matching_capability() {
        let peer = peer_with(&[camera::API.resource_name("cam1")]);
        let resolver = Resolver::new(peer.clone(), registry());

        let cam = resolver.resolve::<CameraClient>("cam1").await.unwrap();
        assert_eq!(cam.resource_name(), &camera::API.resource_name("cam1"));
    }

    #[tokio::test]
    async fn test_resolve_mismatched_capability() {
        let peer = peer_with(&[gripper::API.resource_name("cam1")]);
        let resolver = Resolver::new(peer, registry());

        match resolver.resolve::<CameraClient>("cam1").await {
            Err(ResourceError::CapabilityMismatch { name, expected, actual }) => {
                assert_eq!(name, "cam1");
                assert_eq!(expected, camera::API);
                assert_eq!(actual, gripper::API);
            }
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(_) => panic!("resolved a gripper as a camera"),
        }
        assert_eq!(resolver.cached_len(), 0);
    }

    #[tokio::test]
    async fn test_resolve_unknown_name() {
        let resolver = Resolver::new(peer_with(&[]), registry());
        let err = resolver.resolve::<GripperClient>("nope").await.err().unwrap();
        assert!(matches!(err, ResourceError::ResourceNotFound(ref n) if n == "nope"));
    }

    #[tokio::test]
    async fn test_resolve_unregistered_capability() {
        let peer = peer_with(&[gripper::API.resource_name("g1")]);
        let resolver = Resolver::new(peer.clone(), Arc::new(Registry::new()));
        let err = resolver.resolve::<GripperClient>("g1").await.err().unwrap();
        assert!(matches!(err, ResourceError::UnknownCapability(_)));
        // Fails before the peer is asked.
        assert_eq!(peer.lookups(), 0);
    }

    #[tokio::test]
    async fn test_resolve_returns_cached_proxy() {
        let peer = peer_with(&[gripper::API.resource_name("g1")]);
        let resolver = Resolver::new(peer.clone(), registry());

        let first = resolver.resolve::<GripperClient>("g1").await.unwrap();
        let second = resolver.resolve::<GripperClient>("g1").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(resolver.cached_len(), 1);
        // The peer is still consulted on every resolve.
        assert_eq!(peer.lookups(), 2);
    }

    #[tokio::test]
    async fn test_cache_can_be_disabled() {
        let peer = peer_with(&[gripper::API.resource_name("g1")]);
        let config = ClientConfig {
            cache_proxies: false,
            ..ClientConfig::default()
        };
        let resolver = Resolver::with_config(peer, registry(), config);
        let first = resolver.resolve::<GripperClient>("g1").await.unwrap();
        let second = resolver.resolve::<GripperClient>("g1").await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(resolver.cached_len(), 0);
    }

    #[tokio::test]
    async fn test_resolve_dyn_uses_registered_constructor() {
        let peer = peer_with(&[gripper::API.resource_name("g1")]);
        peer.respond("do_command", json!({"result": {"ok": true}}));
        let resolver = Resolver::new(peer.clone(), registry());

        let resource = resolver.resolve_dyn("g1", &gripper::API).await.unwrap();
        assert_eq!(resource.api(), &gripper::API);
        let reply = resource
            .do_command(Default::default(), CallOptions::default())
            .await
            .unwrap();
        assert_eq!(reply["ok"], true);
        assert_eq!(peer.calls()[0].service, gripper::SERVICE);

        let again = resolver.resolve_dyn("g1", &gripper::API).await.unwrap();
        assert!(Arc::ptr_eq(&resource, &again));

        let err = resolver
            .resolve_dyn("g1", &camera::API)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ResourceError::CapabilityMismatch { .. }));
    }

    #[tokio::test]
    async fn test_get_properties_scenario() {
        let peer = peer_with(&[camera::API.resource_name("cam1")]);
        peer.respond(
            "get_properties",
            json!({"supports_pcd": true, "mime_types": ["image/jpeg"]}),
        );
        let resolver = Resolver::new(peer.clone(), registry());
        let cam = resolver.resolve::<CameraClient>("cam1").await.unwrap();

        let props = cam
            .get_properties(CallOptions::new().with_timeout(Duration::from_secs(5)))
            .await
            .unwrap();
        assert!(props.supports_pcd);

        let calls = peer.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "get_properties");
        assert_eq!(calls[0].timeout, Some(Duration::from_secs(5)));
        assert_eq!(calls[0].metadata, Metadata::new());
    }

    #[tokio::test]
    async fn test_default_metadata_from_config() {
        let peer = peer_with(&[gripper::API.resource_name("g1")]);
        peer.respond("grab", json!({"success": true}));
        let config = ClientConfig {
            default_metadata: [("client", "rust"), ("trace", "off")].into_iter().collect(),
            ..ClientConfig::default()
        };
        let resolver = Resolver::with_config(peer.clone(), registry(), config);
        let g = resolver.resolve::<GripperClient>("g1").await.unwrap();

        assert!(g.grab(CallOptions::new().with_metadata("trace", "on")).await.unwrap());
        let expected: Metadata = [("client", "rust"), ("trace", "on")].into_iter().collect();
        assert_eq!(peer.calls()[0].metadata, expected);
    }

    #[tokio::test]
    async fn test_removed_event_invalidates_proxy() {
        let name = gripper::API.resource_name("g1");
        let peer = peer_with(&[name.clone()]);
        let resolver = Resolver::new(peer.clone(), registry());
        let g = resolver.resolve::<GripperClient>("g1").await.unwrap();

        assert_eq!(resolver.handle_event(&ResourceEvent::Reconfigured(name.clone())), 0);
        assert_eq!(resolver.handle_event(&ResourceEvent::Removed(name.clone())), 1);
        assert_eq!(resolver.cached_len(), 0);

        let err = g.stop(CallOptions::default()).await.unwrap_err();
        assert!(matches!(err, ResourceError::ResourceNoLongerAvailable(ref n) if n == &name));
        assert!(peer.calls().is_empty());

        // A fresh resolve yields a new, usable proxy.
        let fresh = resolver.resolve::<GripperClient>("g1").await.unwrap();
        assert!(!Arc::ptr_eq(&g, &fresh));
        assert_eq!(fresh.base().state(), crate::rpc::ProxyState::Bound);
    }

    #[tokio::test]
    async fn test_removed_event_reaches_uncached_proxies() {
        let name = gripper::API.resource_name("g1");
        let peer = peer_with(&[name.clone()]);
        peer.respond("stop", json!({}));
        let config = ClientConfig {
            cache_proxies: false,
            ..ClientConfig::default()
        };
        let resolver = Resolver::with_config(peer.clone(), registry(), config);
        let first = resolver.resolve::<GripperClient>("g1").await.unwrap();
        let second = resolver.resolve::<GripperClient>("g1").await.unwrap();
        let dynamic = resolver.resolve_dyn("g1", &gripper::API).await.unwrap();

        assert_eq!(resolver.handle_event(&ResourceEvent::Removed(name.clone())), 3);
        assert_eq!(first.base().state(), crate::rpc::ProxyState::Invalid);
        assert_eq!(second.base().state(), crate::rpc::ProxyState::Invalid);

        let err = first.stop(CallOptions::default()).await.unwrap_err();
        assert!(matches!(err, ResourceError::ResourceNoLongerAvailable(ref n) if n == &name));
        let err = dynamic
            .do_command(Default::default(), CallOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ResourceError::ResourceNoLongerAvailable(_)));
        assert!(peer.calls().is_empty());

        // Nothing is left to invalidate.
        assert_eq!(resolver.handle_event(&ResourceEvent::Removed(name)), 0);
    }

    #[tokio::test]
    async fn test_dropped_proxies_are_not_counted() {
        let name = gripper::API.resource_name("g1");
        let config = ClientConfig {
            cache_proxies: false,
            ..ClientConfig::default()
        };
        let resolver = Resolver::with_config(peer_with(&[name.clone()]), registry(), config);
        drop(resolver.resolve::<GripperClient>("g1").await.unwrap());
        let kept = resolver.resolve::<GripperClient>("g1").await.unwrap();

        assert_eq!(resolver.handle_event(&ResourceEvent::Removed(name)), 1);
        assert_eq!(kept.base().state(), crate::rpc::ProxyState::Invalid);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_resolves_share_one_tracked_proxy() {
        let name = gripper::API.resource_name("g1");
        let resolver = Arc::new(Resolver::new(peer_with(&[name.clone()]), registry()));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let resolver = resolver.clone();
            handles.push(tokio::spawn(async move {
                resolver.resolve::<GripperClient>("g1").await.unwrap()
            }));
        }
        let mut proxies = Vec::new();
        for handle in handles {
            proxies.push(handle.await.unwrap());
        }
        assert!(proxies.iter().all(|p| Arc::ptr_eq(p, &proxies[0])));

        resolver.handle_event(&ResourceEvent::Removed(name));
        assert!(proxies
            .iter()
            .all(|p| p.base().state() == crate::rpc::ProxyState::Invalid));
    }

    #[tokio::test]
    async fn test_event_watcher_follows_peer() {
        let name = gripper::API.resource_name("g1");
        let peer = peer_with(&[name.clone()]);
        let resolver = Resolver::connect(peer.clone(), registry(), ClientConfig::default());
        let g = resolver.resolve::<GripperClient>("g1").await.unwrap();

        peer.remove_resource(&name);
        peer.publish(ResourceEvent::Removed(name.clone()));

        tokio::time::timeout(Duration::from_secs(5), async {
            while g.base().state() == crate::rpc::ProxyState::Bound {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        let err = resolver.resolve::<GripperClient>("g1").await.err().unwrap();
        assert!(matches!(err, ResourceError::ResourceNotFound(_)));
    }

    #[tokio::test]
    async fn test_resource_names() {
        let names = vec![
            camera::API.resource_name("cam1"),
            gripper::API.resource_name("g1"),
        ];
        let resolver = Resolver::new(peer_with(&names), registry());
        assert_eq!(resolver.resource_names().await.unwrap(), names);
    }

    #[tokio::test]
    async fn test_concurrent_resolution() {
        let peer = peer_with(&[
            camera::API.resource_name("cam1"),
            gripper::API.resource_name("g1"),
        ]);
        peer.respond("is_moving", json!({"is_moving": false}));
        let resolver = Arc::new(Resolver::new(peer.clone(), registry()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let resolver = resolver.clone();
            handles.push(tokio::spawn(async move {
                let g = resolver.resolve::<GripperClient>("g1").await.unwrap();
                g.is_moving(CallOptions::default()).await.unwrap()
            }));
        }
        for handle in handles {
            assert!(!handle.await.unwrap());
        }
        assert_eq!(peer.calls().len(), 8);
    }
}
