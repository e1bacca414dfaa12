//! Gantry capability: multi-axis linear positioning.

use async_trait::async_trait;

use crate::error::Result;
use crate::resource::{Api, CallOptions, Component, InterfaceDefinition};

pub const API: Api = Api::component("gantry");
pub const SERVICE: &str = "rdk.component.gantry.v1.GantryService";

/// Method set of the gantry service.
pub fn definition() -> InterfaceDefinition {
    InterfaceDefinition::new(API, SERVICE)
        .mandatory("get_position")
        .mandatory("move_to_position")
        .mandatory("get_lengths")
        .mandatory("home")
        .mandatory("stop")
        .mandatory("is_moving")
}

/// A multi-axis linear positioner. Every vector has one entry per axis,
/// positions and lengths in millimetres, speeds in mm/s.
#[async_trait]
pub trait Gantry: Component {
    async fn get_position(&self, opts: CallOptions) -> Result<Vec<f64>>;

    async fn move_to_position(&self, positions: Vec<f64>, speeds: Vec<f64>, opts: CallOptions) -> Result<()>;

    async fn get_lengths(&self, opts: CallOptions) -> Result<Vec<f64>>;

    /// Run the homing sequence. Returns whether it completed.
    async fn home(&self, opts: CallOptions) -> Result<bool>;

    async fn stop(&self, opts: CallOptions) -> Result<()>;

    async fn is_moving(&self, opts: CallOptions) -> Result<bool>;
}
