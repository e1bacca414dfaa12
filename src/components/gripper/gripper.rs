//! Gripper capability and its method set.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resource::{Api, CallOptions, Component, InterfaceDefinition, Struct};

pub const API: Api = Api::component("gripper");
pub const SERVICE: &str = "rdk.component.gripper.v1.GripperService";

/// Method set of the gripper service.
pub fn definition() -> InterfaceDefinition {
    InterfaceDefinition::new(API, SERVICE)
        .mandatory("open")
        .mandatory("grab")
        .mandatory("stop")
        .mandatory("is_holding_something")
        .mandatory("is_moving")
}

/// Whether the gripper holds an object, with driver specific detail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HoldingStatus {
    pub is_holding_something: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Struct>,
}

/// An end effector that opens and closes around objects.
#[async_trait]
pub trait Gripper: Component {
    async fn open(&self, opts: CallOptions) -> Result<()>;

    /// Close until something is grabbed or the gripper is fully closed.
    /// Returns whether something was grabbed.
    async fn grab(&self, opts: CallOptions) -> Result<bool>;

    async fn is_holding_something(&self, opts: CallOptions) -> Result<HoldingStatus>;

    async fn stop(&self, opts: CallOptions) -> Result<()>;

    async fn is_moving(&self, opts: CallOptions) -> Result<bool>;
}
