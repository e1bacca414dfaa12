//! # RPC Proxies
//!
//! [`ProxyBase`] carries the name injection, metadata merge, timeout
//! passthrough and invalidation shared by every proxy. A capability's proxy
//! is a thin struct around a `ProxyBase` that implements the capability trait
//! by encoding each call's arguments, and [`ResourceClient`] ties that struct
//! to its descriptor so the resolver can build it with static typing.
//!
//! Optional operations a proxy does not override keep the trait default and
//! fail with `NotImplemented` naming the method.

pub mod client_base;
pub mod messages;
pub mod stream;

pub use client_base::{ProxyBase, ProxyLifecycle, ProxyState};
pub use stream::ProxyStream;

use crate::resource::{Api, InterfaceDefinition, Resource};

/// A proxy type bound to exactly one capability descriptor.
pub trait ResourceClient: Resource + Sized + 'static {
    /// The descriptor this proxy implements.
    const API: Api;

    /// The interface definition registered for [`Self::API`].
    fn definition() -> InterfaceDefinition;

    /// Build the proxy around an already bound base.
    fn from_base(base: ProxyBase) -> Self;

    fn base(&self) -> &ProxyBase;
}
