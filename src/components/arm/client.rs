//! Arm proxy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::arm::{self, Arm, JointPositions};
use crate::common::{Geometry, Kinematics, Pose};
use crate::error::Result;
use crate::resource::{Api, CallOptions, Component, InterfaceDefinition, Resource, ResourceName, Struct};
use crate::rpc::{ProxyBase, ResourceClient};

#[derive(Serialize)]
struct MoveToPositionRequest<'a> {
    name: &'a str,
    to: &'a Pose,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<&'a Struct>,
}

#[derive(Serialize)]
struct MoveToJointPositionsRequest<'a> {
    name: &'a str,
    positions: &'a JointPositions,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<&'a Struct>,
}

#[derive(Deserialize)]
struct GetEndPositionResponse {
    pose: Pose,
}

#[derive(Deserialize)]
struct GetJointPositionsResponse {
    positions: JointPositions,
}

/// Arm proxy.
#[derive(Debug, Clone)]
pub struct ArmClient {
    base: ProxyBase,
}

impl ResourceClient for ArmClient {
    const API: Api = arm::API;

    fn definition() -> InterfaceDefinition {
        arm::definition()
    }

    fn from_base(base: ProxyBase) -> Self {
        Self { base }
    }

    fn base(&self) -> &ProxyBase {
        &self.base
    }
}

#[async_trait]
impl Resource for ArmClient {
    fn resource_name(&self) -> &ResourceName {
        self.base.resource_name()
    }

    async fn do_command(&self, command: Struct, opts: CallOptions) -> Result<Struct> {
        self.base.do_command(command, &opts).await
    }
}

#[async_trait]
impl Component for ArmClient {
    async fn get_geometries(&self, opts: CallOptions) -> Result<Vec<Geometry>> {
        self.base.get_geometries(&opts).await
    }

    async fn get_kinematics(&self, opts: CallOptions) -> Result<Kinematics> {
        self.base.get_kinematics(&opts).await
    }
}

#[async_trait]
impl Arm for ArmClient {
    async fn get_end_position(&self, opts: CallOptions) -> Result<Pose> {
        let response: GetEndPositionResponse = self
            .base
            .unary("get_end_position", &self.base.name_request(&opts), &opts)
            .await?;
        Ok(response.pose)
    }

    async fn move_to_position(&self, pose: Pose, opts: CallOptions) -> Result<()> {
        let request = MoveToPositionRequest {
            name: self.base.resource_name().name(),
            to: &pose,
            extra: opts.extra.as_ref(),
        };
        self.base.unary_void("move_to_position", &request, &opts).await
    }

    async fn get_joint_positions(&self, opts: CallOptions) -> Result<JointPositions> {
        let response: GetJointPositionsResponse = self
            .base
            .unary("get_joint_positions", &self.base.name_request(&opts), &opts)
            .await?;
        Ok(response.positions)
    }

    async fn move_to_joint_positions(&self, positions: JointPositions, opts: CallOptions) -> Result<()> {
        let request = MoveToJointPositionsRequest {
            name: self.base.resource_name().name(),
            positions: &positions,
            extra: opts.extra.as_ref(),
        };
        self.base
            .unary_void("move_to_joint_positions", &request, &opts)
            .await
    }

    async fn stop(&self, opts: CallOptions) -> Result<()> {
        self.base
            .unary_void("stop", &self.base.name_request(&opts), &opts)
            .await
    }

    async fn is_moving(&self, opts: CallOptions) -> Result<bool> {
        self.base.is_moving(&opts).await
    }
}
