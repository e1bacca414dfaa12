//! Gantry proxy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::gantry::{self, Gantry};
use crate::common::{Geometry, Kinematics};
use crate::error::Result;
use crate::resource::{Api, CallOptions, Component, InterfaceDefinition, Resource, ResourceName, Struct};
use crate::rpc::{ProxyBase, ResourceClient};

#[derive(Serialize)]
struct MoveToPositionRequest<'a> {
    name: &'a str,
    positions_mm: &'a [f64],
    speeds_mm_per_sec: &'a [f64],
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<&'a Struct>,
}

#[derive(Deserialize)]
struct GetPositionResponse {
    positions_mm: Vec<f64>,
}

#[derive(Deserialize)]
struct GetLengthsResponse {
    lengths_mm: Vec<f64>,
}

#[derive(Deserialize)]
struct HomeResponse {
    homed: bool,
}

#[derive(Debug, Clone)]
pub struct GantryClient {
    base: ProxyBase,
}

impl ResourceClient for GantryClient {
    const API: Api = gantry::API;

    fn definition() -> InterfaceDefinition {
        gantry::definition()
    }

    fn from_base(base: ProxyBase) -> Self {
        Self { base }
    }

    fn base(&self) -> &ProxyBase {
        &self.base
    }
}

#[async_trait]
impl Resource for GantryClient {
    fn resource_name(&self) -> &ResourceName {
        self.base.resource_name()
    }

    async fn do_command(&self, command: Struct, opts: CallOptions) -> Result<Struct> {
        self.base.do_command(command, &opts).await
    }
}

#[async_trait]
impl Component for GantryClient {
    async fn get_geometries(&self, opts: CallOptions) -> Result<Vec<Geometry>> {
        self.base.get_geometries(&opts).await
    }

    async fn get_kinematics(&self, opts: CallOptions) -> Result<Kinematics> {
        self.base.get_kinematics(&opts).await
    }
}

#[async_trait]
impl Gantry for GantryClient {
    async fn get_position(&self, opts: CallOptions) -> Result<Vec<f64>> {
        let response: GetPositionResponse = self
            .base
            .unary("get_position", &self.base.name_request(&opts), &opts)
            .await?;
        Ok(response.positions_mm)
    }

    async fn move_to_position(&self, positions: Vec<f64>, speeds: Vec<f64>, opts: CallOptions) -> Result<()> {
        let request = MoveToPositionRequest {
            name: self.base.resource_name().name(),
            positions_mm: &positions,
            speeds_mm_per_sec: &speeds,
            extra: opts.extra.as_ref(),
        };
        self.base.unary_void("move_to_position", &request, &opts).await
    }

    async fn get_lengths(&self, opts: CallOptions) -> Result<Vec<f64>> {
        let response: GetLengthsResponse = self
            .base
            .unary("get_lengths", &self.base.name_request(&opts), &opts)
            .await?;
        Ok(response.lengths_mm)
    }

    async fn home(&self, opts: CallOptions) -> Result<bool> {
        let response: HomeResponse = self
            .base
            .unary("home", &self.base.name_request(&opts), &opts)
            .await?;
        Ok(response.homed)
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
