//! Gripper proxy over a peer connection.

use async_trait::async_trait;
use serde::Deserialize;

use super::gripper::{self, Gripper, HoldingStatus};
use crate::common::{Geometry, Kinematics};
use crate::error::Result;
use crate::resource::{Api, CallOptions, Component, InterfaceDefinition, Resource, ResourceName, Struct};
use crate::rpc::{ProxyBase, ResourceClient};

#[derive(Deserialize)]
struct GrabResponse {
    success: bool,
}

/// Gripper proxy.
#[derive(Debug, Clone)]
pub struct GripperClient {
    base: ProxyBase,
}

impl ResourceClient for GripperClient {
    const API: Api = gripper::API;

    fn definition() -> InterfaceDefinition {
        gripper::definition()
    }

    fn from_base(base: ProxyBase) -> Self {
        Self { base }
    }

    fn base(&self) -> &ProxyBase {
        &self.base
    }
}

#[async_trait]
impl Resource for GripperClient {
    fn resource_name(&self) -> &ResourceName {
        self.base.resource_name()
    }

    async fn do_command(&self, command: Struct, opts: CallOptions) -> Result<Struct> {
        self.base.do_command(command, &opts).await
    }
}

#[async_trait]
impl Component for GripperClient {
    async fn get_geometries(&self, opts: CallOptions) -> Result<Vec<Geometry>> {
        self.base.get_geometries(&opts).await
    }

    async fn get_kinematics(&self, opts: CallOptions) -> Result<Kinematics> {
        self.base.get_kinematics(&opts).await
    }
}

#[async_trait]
impl Gripper for GripperClient {
    async fn open(&self, opts: CallOptions) -> Result<()> {
        self.base
            .unary_void("open", &self.base.name_request(&opts), &opts)
            .await
    }

    async fn grab(&self, opts: CallOptions) -> Result<bool> {
        let response: GrabResponse = self
            .base
            .unary("grab", &self.base.name_request(&opts), &opts)
            .await?;
        Ok(response.success)
    }

    async fn is_holding_something(&self, opts: CallOptions) -> Result<HoldingStatus> {
        self.base
            .unary("is_holding_something", &self.base.name_request(&opts), &opts)
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
