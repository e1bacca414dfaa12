//! Sensor proxy.

use async_trait::async_trait;
use serde::Deserialize;

use super::sensor::{self, Readings, Sensor};
use crate::common::{Geometry, Kinematics};
use crate::error::Result;
use crate::resource::{Api, CallOptions, Component, InterfaceDefinition, Resource, ResourceName, Struct};
use crate::rpc::{ProxyBase, ResourceClient};

#[derive(Deserialize)]
struct GetReadingsResponse {
    #[serde(default)]
    readings: Readings,
}

#[derive(Debug, Clone)]
pub struct SensorClient {
    base: ProxyBase,
}

impl ResourceClient for SensorClient {
    const API: Api = sensor::API;

    fn definition() -> InterfaceDefinition {
        sensor::definition()
    }

    fn from_base(base: ProxyBase) -> Self {
        Self { base }
    }

    fn base(&self) -> &ProxyBase {
        &self.base
    }
}

#[async_trait]
impl Resource for SensorClient {
    fn resource_name(&self) -> &ResourceName {
        self.base.resource_name()
    }

    async fn do_command(&self, command: Struct, opts: CallOptions) -> Result<Struct> {
        self.base.do_command(command, &opts).await
    }
}

#[async_trait]
impl Component for SensorClient {
    async fn get_geometries(&self, opts: CallOptions) -> Result<Vec<Geometry>> {
        self.base.get_geometries(&opts).await
    }

    async fn get_kinematics(&self, opts: CallOptions) -> Result<Kinematics> {
        self.base.get_kinematics(&opts).await
    }
}

#[async_trait]
impl Sensor for SensorClient {
    async fn get_readings(&self, opts: CallOptions) -> Result<Readings> {
        let response: GetReadingsResponse = self
            .base
            .unary("get_readings", &self.base.name_request(&opts), &opts)
            .await?;
        Ok(response.readings)
    }
}
