//! Descriptors and names: the identifiers every resource is addressed by.
//!
//! An [`Api`] is the `(namespace, type, subtype)` triple naming one capability
//! interface (e.g. `rdk:component:camera`). A [`ResourceName`] pairs an `Api`
//! with the resource's name on a peer (`rdk:component:camera/cam1`). A
//! [`Model`] names one local implementation of an `Api`.
//!
//! All three are immutable, compare structurally and round-trip through their
//! string form, which is also their serialized form.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ResourceError;

/// Namespace reserved for the built-in capabilities.
pub const RESOURCE_NAMESPACE_RDK: &str = "rdk";

static SEGMENT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w-]+$").unwrap());

fn validate_segment(kind: &str, value: &str) -> Result<(), ResourceError> {
    if SEGMENT_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(ResourceError::InvalidName(format!(
            "{} must contain only alphanumerics, underscores and hyphens: {:?}",
            kind, value
        )))
    }
}

// ---------------------------------------------------------------------------
// ResourceType
// ---------------------------------------------------------------------------

/// Whether a capability is a physical component or a software service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Component,
    Service,
}

impl ResourceType {
    /// Wire form: `component` or `service`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Component => "component",
            ResourceType::Service => "service",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "component" => Ok(ResourceType::Component),
            "service" => Ok(ResourceType::Service),
            other => Err(ResourceError::InvalidName(format!(
                "unknown resource type: {:?}",
                other
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Api
// ---------------------------------------------------------------------------

/// Capability descriptor: `namespace:type:subtype`.
///
/// Built-in descriptors are `const` so each capability module can expose its
/// own `API` constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Api {
    namespace: Cow<'static, str>,
    resource_type: ResourceType,
    subtype: Cow<'static, str>,
}

impl Api {
    /// Build a descriptor from static parts. No validation is performed, so
    /// this is meant for compile-time constants.
    pub const fn from_static(
        namespace: &'static str,
        resource_type: ResourceType,
        subtype: &'static str,
    ) -> Self {
        Self {
            namespace: Cow::Borrowed(namespace),
            resource_type,
            subtype: Cow::Borrowed(subtype),
        }
    }

    /// A built-in `rdk:component:<subtype>` descriptor.
    pub const fn component(subtype: &'static str) -> Self {
        Self::from_static(RESOURCE_NAMESPACE_RDK, ResourceType::Component, subtype)
    }

    /// A built-in `rdk:service:<subtype>` descriptor.
    pub const fn service(subtype: &'static str) -> Self {
        Self::from_static(RESOURCE_NAMESPACE_RDK, ResourceType::Service, subtype)
    }

    /// Build and validate a descriptor from runtime strings.
    pub fn new(
        namespace: impl Into<String>,
        resource_type: ResourceType,
        subtype: impl Into<String>,
    ) -> Result<Self, ResourceError> {
        let namespace = namespace.into();
        let subtype = subtype.into();
        validate_segment("namespace", &namespace)?;
        validate_segment("subtype", &subtype)?;
        Ok(Self {
            namespace: Cow::Owned(namespace),
            resource_type,
            subtype: Cow::Owned(subtype),
        })
    }

    /// Organization owning the capability, e.g. `rdk`.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Component or service.
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Capability name within the namespace, e.g. `camera`.
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// Name a resource implementing this capability.
    pub fn resource_name(&self, name: impl Into<String>) -> ResourceName {
        ResourceName {
            api: self.clone(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.resource_type, self.subtype)
    }
}

impl FromStr for Api {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [namespace, resource_type, subtype] => {
                Api::new(*namespace, resource_type.parse()?, *subtype)
            }
            _ => Err(ResourceError::InvalidName(format!(
                "expected namespace:type:subtype, got {:?}",
                s
            ))),
        }
    }
}

impl From<Api> for String {
    fn from(api: Api) -> Self {
        api.to_string()
    }
}

impl TryFrom<String> for Api {
    type Error = ResourceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// ResourceName
// ---------------------------------------------------------------------------

/// One addressable resource on a peer: `namespace:type:subtype/name`.
///
/// Resources that live on a remote of the peer carry the remote's prefix in
/// their name (`remote1:cam1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ResourceName {
    api: Api,
    name: String,
}

impl ResourceName {
    /// Validated name; rejects empty names and names containing `/`.
    pub fn new(api: Api, name: impl Into<String>) -> Result<Self, ResourceError> {
        let name = name.into();
        if name.is_empty() || name.contains('/') {
            return Err(ResourceError::InvalidName(format!(
                "resource name must be non-empty and must not contain '/': {:?}",
                name
            )));
        }
        Ok(Self { api, name })
    }

    /// Capability of the resource.
    pub fn api(&self) -> &Api {
        &self.api
    }

    /// The name as the peer knows it, including any remote prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name without the remote prefix.
    pub fn short_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// The remote prefix, if the resource lives on a remote of the peer.
    pub fn remote(&self) -> Option<&str> {
        self.name.rsplit_once(':').map(|(remote, _)| remote)
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api, self.name)
    }
}

impl FromStr for ResourceName {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (api, name) = s.split_once('/').ok_or_else(|| {
            ResourceError::InvalidName(format!("expected api/name, got {:?}", s))
        })?;
        ResourceName::new(api.parse()?, name)
    }
}

impl From<ResourceName> for String {
    fn from(name: ResourceName) -> Self {
        name.to_string()
    }
}

impl TryFrom<String> for ResourceName {
    type Error = ResourceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// A local implementation of a capability: `namespace:family:name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Model {
    namespace: String,
    family: String,
    name: String,
}

impl Model {
    /// Validated model triplet.
    pub fn new(
        namespace: impl Into<String>,
        family: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, ResourceError> {
        let model = Self {
            namespace: namespace.into(),
            family: family.into(),
            name: name.into(),
        };
        validate_segment("model namespace", &model.namespace)?;
        validate_segment("model family", &model.family)?;
        validate_segment("model name", &model.name)?;
        Ok(model)
    }

    /// Organization owning the model.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Model family.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Model name within its family.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.family, self.name)
    }
}

impl FromStr for Model {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [namespace, family, name] => Model::new(*namespace, *family, *name),
            _ => Err(ResourceError::InvalidName(format!(
                "expected namespace:family:name, got {:?}",
                s
            ))),
        }
    }
}

impl From<Model> for String {
    fn from(model: Model) -> Self {
        model.to_string()
    }
}

impl TryFrom<String> for Model {
    type Error = ResourceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
