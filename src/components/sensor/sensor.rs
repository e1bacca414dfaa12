//! Generic sensor capability.

use async_trait::async_trait;

use crate::error::Result;
use crate::resource::{Api, CallOptions, Component, InterfaceDefinition, Struct};

pub const API: Api = Api::component("sensor");
pub const SERVICE: &str = "rdk.component.sensor.v1.SensorService";

/// Method set of the sensor service.
pub fn definition() -> InterfaceDefinition {
    InterfaceDefinition::new(API, SERVICE).mandatory("get_readings")
}

/// Named measurements; the value shapes are sensor specific.
pub type Readings = Struct;

#[async_trait]
pub trait Sensor: Component {
    async fn get_readings(&self, opts: CallOptions) -> Result<Readings>;
}
