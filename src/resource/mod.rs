//! # Resources
//!
//! Identifiers, the base resource contract, interface definitions and the
//! registry that ties a capability descriptor to its definition and
//! constructors.
//!
//! ```text
//! Api (rdk:component:camera) ──► Registry ──► InterfaceDefinition
//!                                   │
//!                                   ├──► RpcClientConstructor (proxy)
//!                                   └──► ModelCreator (local implementation)
//! ```

pub mod base;
pub mod definition;
pub mod registry;
pub mod types;

pub use base::{CallOptions, Component, Metadata, Resource, Struct};
pub use definition::{
    CallKind, InterfaceDefinition, MethodDef, Requirement, DO_COMMAND, GET_GEOMETRIES,
    GET_KINEMATICS,
};
pub use registry::{ApiRegistration, ModelCreator, Registry, ResourceConfig, RpcClientConstructor};
pub use types::{Api, Model, ResourceName, ResourceType, RESOURCE_NAMESPACE_RDK};
