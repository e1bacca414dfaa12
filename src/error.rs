//! Error taxonomy for resource resolution and RPC proxies.
//!
//! Every failure is returned to the immediate caller. Nothing in this crate
//! logs-and-swallows an error or retries a call.

use thiserror::Error;

use crate::resource::{Api, Model, ResourceName};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ResourceError>;

/// Failures surfaced by the registry, the resolver and every proxy.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Registry lookup miss.
    #[error("Unknown capability: {0}")]
    UnknownCapability(Api),

    /// A descriptor was registered twice with conflicting definitions.
    #[error("Duplicate registration: {0}")]
    DuplicateRegistration(String),

    /// The peer has no resource with that name.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// The name exists on the peer but implements a different capability.
    #[error("Resource {name} is a {actual}, not a {expected}")]
    CapabilityMismatch {
        name: String,
        expected: Api,
        actual: Api,
    },

    /// An optional method was called on an implementation that does not
    /// provide it. Carries the method name exactly.
    #[error("Method {0} not implemented")]
    NotImplemented(String),

    /// The proxy was invalidated because the peer removed the underlying
    /// resource.
    #[error("Resource no longer available: {0}")]
    ResourceNoLongerAvailable(ResourceName),

    /// The peer was reached but refused the operation.
    #[error("{method} rejected by peer ({code}): {message}")]
    Rejected {
        method: String,
        code: u32,
        message: String,
    },

    /// The peer could not be reached.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Request or response (de)serialization failed.
    #[error("Codec error: {0}")]
    Codec(String),

    /// A descriptor, resource name or model string did not parse.
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// No local creator registered for the (api, model) pair.
    #[error("No model {model} registered for {api}")]
    UnknownModel { api: Api, model: Model },
}

impl ResourceError {
    /// Shorthand for the optional-method fallback.
    pub fn not_implemented(method: impl Into<String>) -> Self {
        ResourceError::NotImplemented(method.into())
    }

    /// Whether this error is the signal that an optional method is absent.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, ResourceError::NotImplemented(_))
    }

    /// Whether the peer was unreachable, as opposed to reachable but refusing.
    pub fn is_transport(&self) -> bool {
        matches!(self, ResourceError::Transport(_))
    }
}

/// Opaque failure from the peer connection. Never reinterpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("peer unavailable: {0}")]
    Unavailable(String),

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("connection reset by peer")]
    Reset,

    #[error("call cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

/// What a peer connection returns when a call does not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The call never reached the resource.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The peer answered with a non-OK status.
    #[error("status {code}: {message}")]
    Status { code: u32, message: String },
}

impl CallError {
    /// Attach the method name and lift into a [`ResourceError`].
    pub fn into_resource_error(self, method: &str) -> ResourceError {
        match self {
            CallError::Transport(err) => ResourceError::Transport(err),
            CallError::Status { code, message } => ResourceError::Rejected {
                method: method.to_string(),
                code,
                message,
            },
        }
    }
}

/// Errors raised while loading [`crate::config::ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
