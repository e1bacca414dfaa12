//! # rdk-client
//!
//! Typed, asynchronous access to the components and services of a remote
//! robot controller.
//!
//! A controller exposes named resources, each implementing one capability
//! identified by a descriptor such as `rdk:component:camera`. This crate
//! turns a resource name into a proxy implementing that capability's trait:
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use rdk_client::{Resolver, Registry, ClientConfig, PeerConnection};
//! # use rdk_client::components::{self, camera::{Camera, CameraClient}};
//! # use rdk_client::resource::CallOptions;
//! # async fn demo(peer: Arc<dyn PeerConnection>) -> rdk_client::Result<()> {
//! components::register_builtins(&Registry::global())?;
//! let resolver = Resolver::connect(peer, Registry::global(), ClientConfig::from_env().unwrap_or_default());
//! let cam = resolver.resolve::<CameraClient>("cam1").await?;
//! let props = cam.get_properties(CallOptions::default()).await?;
//! # let _ = props;
//! # Ok(())
//! # }
//! ```
//!
//! The transport is supplied by the application through [`PeerConnection`].

pub mod codec;
pub mod common;
pub mod components;
pub mod config;
pub mod error;
pub mod logging;
pub mod peer;
pub mod resolver;
pub mod resource;
pub mod rpc;

#[cfg(test)]
mod testing;

pub use config::ClientConfig;
pub use error::{CallError, ConfigError, ResourceError, Result, TransportError};
pub use peer::{CallRequest, PeerConnection, ResourceEvent, ResponseStream};
pub use resolver::Resolver;
pub use resource::{
    Api, CallOptions, Component, InterfaceDefinition, Metadata, Model, Registry, Resource,
    ResourceName, ResourceType, Struct,
};
pub use rpc::{ProxyBase, ProxyState, ProxyStream, ResourceClient};
