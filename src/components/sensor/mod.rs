//! Sensor capability (`rdk:component:sensor`).

mod client;
#[allow(clippy::module_inception)]
mod sensor;

pub use client::SensorClient;
pub use sensor::{definition, Readings, Sensor, API, SERVICE};
