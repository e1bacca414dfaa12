//! Resource Registry: maps capability descriptors to their interface
//! definition and to the constructors for proxies and local implementations.
//!
//! Capabilities are compiled in, not hot-loaded: each capability module is
//! registered once during start-up (see
//! [`crate::components::register_builtins`]) and nothing is ever removed.
//! Registration is nevertheless guarded by a lock, so registering at runtime
//! while other tasks resolve resources is safe.
//!
//! Two tables are kept:
//! 1. `Api -> ApiRegistration`: the interface definition plus a constructor
//!    producing an RPC proxy from a [`ProxyBase`].
//! 2. `(Api, Model) -> ModelCreator`: constructors for in-process
//!    implementations, keyed by the model that implements the capability.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::base::{Resource, Struct};
use super::definition::InterfaceDefinition;
use super::types::{Api, Model, ResourceName};
use crate::error::{ResourceError, Result};
use crate::rpc::{ProxyBase, ResourceClient};

/// Builds a proxy bound to the name and peer carried by the [`ProxyBase`].
pub type RpcClientConstructor = Arc<dyn Fn(ProxyBase) -> Arc<dyn Resource> + Send + Sync>;

/// Builds an in-process implementation from its configuration.
pub type ModelCreator = Arc<dyn Fn(&ResourceConfig) -> Result<Arc<dyn Resource>> + Send + Sync>;

static GLOBAL: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(Registry::new()));

// ---------------------------------------------------------------------------
// ApiRegistration
// ---------------------------------------------------------------------------

/// Everything the registry knows about one capability.
#[derive(Clone)]
pub struct ApiRegistration {
    pub definition: InterfaceDefinition,
    create_rpc_client: RpcClientConstructor,
}

impl ApiRegistration {
    /// Registration from a definition and a proxy constructor.
    pub fn new(definition: InterfaceDefinition, create_rpc_client: RpcClientConstructor) -> Self {
        Self {
            definition,
            create_rpc_client,
        }
    }

    /// Registration for a statically typed proxy.
    pub fn for_client<C: ResourceClient>() -> Self {
        Self::new(
            C::definition(),
            Arc::new(|base: ProxyBase| Arc::new(C::from_base(base)) as Arc<dyn Resource>),
        )
    }

    /// Descriptor this registration is for.
    pub fn api(&self) -> &Api {
        &self.definition.api
    }

    /// Build a proxy around `base`.
    pub fn create_rpc_client(&self, base: ProxyBase) -> Arc<dyn Resource> {
        (self.create_rpc_client)(base)
    }
}

impl fmt::Debug for ApiRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRegistration")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// ResourceConfig
// ---------------------------------------------------------------------------

/// Configuration handed to a [`ModelCreator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub name: String,
    pub api: Api,
    pub model: Model,
    #[serde(default)]
    pub attributes: Struct,
}

impl ResourceConfig {
    /// The configured resource's full name.
    pub fn resource_name(&self) -> Result<ResourceName> {
        ResourceName::new(self.api.clone(), self.name.clone())
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Process-wide capability registry.
#[derive(Default)]
pub struct Registry {
    apis: RwLock<HashMap<Api, ApiRegistration>>,
    models: RwLock<HashMap<(Api, Model), ModelCreator>>,
}

impl Registry {
    /// Create an empty, isolated registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared process-wide registry.
    pub fn global() -> Arc<Registry> {
        GLOBAL.clone()
    }

    /// Register a capability.
    ///
    /// Re-registering an identical definition is a no-op; a conflicting one
    /// fails with [`ResourceError::DuplicateRegistration`].
    pub fn register(&self, registration: ApiRegistration) -> Result<()> {
        let mut apis = self.apis.write();
        let api = registration.api().clone();
        if let Some(existing) = apis.get(&api) {
            if existing.definition == registration.definition {
                tracing::trace!(%api, "capability already registered");
                return Ok(());
            }
            return Err(ResourceError::DuplicateRegistration(api.to_string()));
        }
        tracing::debug!(%api, service = %registration.definition.service, "registered capability");
        apis.insert(api, registration);
        Ok(())
    }

    /// Register the capability served by proxy type `C`.
    pub fn register_client<C: ResourceClient>(&self) -> Result<()> {
        self.register(ApiRegistration::for_client::<C>())
    }

    /// The interface definition registered for `api`.
    pub fn lookup(&self, api: &Api) -> Result<InterfaceDefinition> {
        self.registration(api).map(|r| r.definition)
    }

    /// The full registration for `api`.
    pub fn registration(&self, api: &Api) -> Result<ApiRegistration> {
        self.apis
            .read()
            .get(api)
            .cloned()
            .ok_or_else(|| ResourceError::UnknownCapability(api.clone()))
    }

    /// Whether `api` is registered.
    pub fn contains(&self, api: &Api) -> bool {
        self.apis.read().contains_key(api)
    }

    /// All registered descriptors, sorted.
    pub fn registered_apis(&self) -> Vec<Api> {
        let mut apis: Vec<Api> = self.apis.read().keys().cloned().collect();
        apis.sort();
        apis
    }

    /// Register a local implementation of `api`.
    ///
    /// The capability itself must already be registered.
    pub fn register_model(&self, api: &Api, model: Model, creator: ModelCreator) -> Result<()> {
        if !self.contains(api) {
            return Err(ResourceError::UnknownCapability(api.clone()));
        }
        let mut models = self.models.write();
        let key = (api.clone(), model);
        if models.contains_key(&key) {
            return Err(ResourceError::DuplicateRegistration(format!("{}/{}", key.0, key.1)));
        }
        tracing::debug!(api = %key.0, model = %key.1, "registered model");
        models.insert(key, creator);
        Ok(())
    }

    /// Models registered for `api`, sorted.
    pub fn models(&self, api: &Api) -> Vec<Model> {
        let mut models: Vec<Model> = self
            .models
            .read()
            .keys()
            .filter(|(a, _)| a == api)
            .map(|(_, m)| m.clone())
            .collect();
        models.sort();
        models
    }

    /// Instantiate a local implementation from its configuration.
    pub fn create_local(&self, config: &ResourceConfig) -> Result<Arc<dyn Resource>> {
        let creator = self
            .models
            .read()
            .get(&(config.api.clone(), config.model.clone()))
            .cloned()
            .ok_or_else(|| ResourceError::UnknownModel {
                api: config.api.clone(),
                model: config.model.clone(),
            })?;
        creator(config)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("apis", &self.registered_apis())
            .field("models", &self.models.read().len())
            .finish()
    }
}
