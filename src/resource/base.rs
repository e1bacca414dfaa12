//! The base resource contract and the per-call options every operation takes.
//!
//! Capability traits (camera, gripper, ...) extend [`Component`], which
//! extends [`Resource`]. Optional operations carry a default body returning
//! [`ResourceError::NotImplemented`] with the method's exact name, so new
//! cross-cutting operations can be added here without breaking existing
//! implementations. Mandatory operations have no default.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::definition::{DO_COMMAND, GET_GEOMETRIES};
use super::types::{Api, ResourceName};
use crate::common::{Geometry, Kinematics};
use crate::error::{ResourceError, Result};

/// Free-form JSON object used for `extra` parameters and command payloads.
pub type Struct = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Transport-level call metadata: an ordered string-to-string map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, String>);

impl Metadata {
    /// Empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    /// Effective metadata for one call: `self` is the default set, and every
    /// key in `overrides` replaces the default value.
    pub fn merged(&self, overrides: &Metadata) -> Metadata {
        let mut merged = self.0.clone();
        for (k, v) in &overrides.0 {
            merged.insert(k.clone(), v.clone());
        }
        Metadata(merged)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Metadata(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Metadata {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// CallOptions
// ---------------------------------------------------------------------------

/// Per-call options accepted by every operation.
///
/// - `extra` travels inside the request body and is interpreted by the
///   resource implementation (operation hints).
/// - `metadata` travels beside the request and is interpreted only by the
///   transport; it overrides the proxy's default metadata key by key.
/// - `timeout` falls back to the peer connection's default when `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOptions {
    pub extra: Option<Struct>,
    pub timeout: Option<Duration>,
    pub metadata: Metadata,
}

impl CallOptions {
    /// Options with no extra, no timeout and no metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deadline for this call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Operation hints sent in the request body.
    pub fn with_extra(mut self, extra: Struct) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Add one metadata entry, overriding the proxy default for `key`.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key, value);
        self
    }
}

// ---------------------------------------------------------------------------
// Resource / Component
// ---------------------------------------------------------------------------

/// Anything addressable by a [`ResourceName`].
#[async_trait]
pub trait Resource: Send + Sync {
    fn resource_name(&self) -> &ResourceName;

    fn api(&self) -> &Api {
        self.resource_name().api()
    }

    fn name(&self) -> &str {
        self.resource_name().name()
    }

    /// Execute an arbitrary, model-specific command.
    async fn do_command(&self, command: Struct, opts: CallOptions) -> Result<Struct> {
        let _ = (command, opts);
        Err(ResourceError::not_implemented(DO_COMMAND))
    }

    /// Release anything the resource holds. Proxies hold nothing.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A physical resource.
#[async_trait]
pub trait Component: Resource {
    /// Geometries of the component in its own frame.
    async fn get_geometries(&self, opts: CallOptions) -> Result<Vec<Geometry>> {
        let _ = opts;
        Err(ResourceError::not_implemented(GET_GEOMETRIES))
    }

    /// Kinematic description of the component. Non-physical components
    /// still answer, typically with an empty file.
    async fn get_kinematics(&self, opts: CallOptions) -> Result<Kinematics>;
}
