//! Interface definitions: the published method set of one capability.
//!
//! A definition lists every operation of a capability together with its call
//! shape and whether implementations must provide it. The registry compares
//! definitions structurally to decide whether a second registration of the
//! same [`Api`] is an idempotent repeat or a conflict.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::types::{Api, ResourceType};

/// Method name of the arbitrary-command escape hatch.
pub const DO_COMMAND: &str = "do_command";
/// Method name of the geometry enumeration.
pub const GET_GEOMETRIES: &str = "get_geometries";
/// Method name of the kinematic description.
pub const GET_KINEMATICS: &str = "get_kinematics";

/// How a method maps onto the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    /// One request, one response.
    Unary,
    /// One request, a lazily produced sequence of responses.
    ServerStreaming,
}

/// Whether implementations must provide a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    Mandatory,
    /// Has a default that fails with `NotImplemented`.
    Optional,
}

/// One operation of a capability interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: Cow<'static, str>,
    pub kind: CallKind,
    pub requirement: Requirement,
}

/// The contract of one capability: descriptor, RPC service and method set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDefinition {
    pub api: Api,
    /// Fully-qualified RPC service name the proxy addresses.
    pub service: Cow<'static, str>,
    pub methods: Vec<MethodDef>,
}

impl InterfaceDefinition {
    /// Start a definition for `api`, pre-populated with the cross-cutting
    /// operations every resource of its type carries.
    pub fn new(api: Api, service: impl Into<Cow<'static, str>>) -> Self {
        let mut def = Self {
            api,
            service: service.into(),
            methods: Vec::new(),
        };
        def = def.optional(DO_COMMAND);
        if def.api.resource_type() == ResourceType::Component {
            def = def.optional(GET_GEOMETRIES).mandatory(GET_KINEMATICS);
        }
        def
    }

    /// Add a mandatory unary method.
    pub fn mandatory(self, name: &'static str) -> Self {
        self.with(name, CallKind::Unary, Requirement::Mandatory)
    }

    /// Add an optional unary method.
    pub fn optional(self, name: &'static str) -> Self {
        self.with(name, CallKind::Unary, Requirement::Optional)
    }

    /// Add a mandatory server-streaming method.
    pub fn streaming(self, name: &'static str) -> Self {
        self.with(name, CallKind::ServerStreaming, Requirement::Mandatory)
    }

    fn with(mut self, name: &'static str, kind: CallKind, requirement: Requirement) -> Self {
        self.methods.retain(|m| m.name != name);
        self.methods.push(MethodDef {
            name: Cow::Borrowed(name),
            kind,
            requirement,
        });
        self
    }

    /// The method named `name`, if declared.
    pub fn method(&self, name: &str) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Whether `name` is declared and optional.
    pub fn is_optional(&self, name: &str) -> bool {
        self.method(name)
            .map_or(false, |m| m.requirement == Requirement::Optional)
    }

    /// Names of the mandatory methods, in declaration order.
    pub fn mandatory_methods(&self) -> impl Iterator<Item = &str> {
        self.methods
            .iter()
            .filter(|m| m.requirement == Requirement::Mandatory)
            .map(|m| m.name.as_ref())
    }

    /// Names of the optional methods, in declaration order.
    pub fn optional_methods(&self) -> impl Iterator<Item = &str> {
        self.methods
            .iter()
            .filter(|m| m.requirement == Requirement::Optional)
            .map(|m| m.name.as_ref())
    }
}
