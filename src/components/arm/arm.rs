//! Arm capability: joint and end-effector motion.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::common::Pose;
use crate::error::Result;
use crate::resource::{Api, CallOptions, Component, InterfaceDefinition};

pub const API: Api = Api::component("arm");
pub const SERVICE: &str = "rdk.component.arm.v1.ArmService";

/// Method set of the arm service.
pub fn definition() -> InterfaceDefinition {
    InterfaceDefinition::new(API, SERVICE)
        .mandatory("get_end_position")
        .mandatory("move_to_position")
        .mandatory("get_joint_positions")
        .mandatory("move_to_joint_positions")
        .mandatory("stop")
        .mandatory("is_moving")
}

/// Joint angles in degrees (revolute) or millimetres (prismatic), base first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointPositions {
    pub values: Vec<f64>,
}

impl From<Vec<f64>> for JointPositions {
    fn from(values: Vec<f64>) -> Self {
        Self { values }
    }
}

#[async_trait]
pub trait Arm: Component {
    /// Pose of the end effector relative to the arm's base.
    async fn get_end_position(&self, opts: CallOptions) -> Result<Pose>;

    async fn move_to_position(&self, pose: Pose, opts: CallOptions) -> Result<()>;

    async fn get_joint_positions(&self, opts: CallOptions) -> Result<JointPositions>;

    async fn move_to_joint_positions(&self, positions: JointPositions, opts: CallOptions) -> Result<()>;

    async fn stop(&self, opts: CallOptions) -> Result<()>;

    async fn is_moving(&self, opts: CallOptions) -> Result<bool>;
}
