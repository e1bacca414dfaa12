//! # Built-in Capabilities
//!
//! Each submodule defines one capability: its descriptor (`API`), its RPC
//! service name (`SERVICE`), the interface definition, the capability trait
//! and the proxy that implements it over a peer connection.
//!
//! Applications adding their own capabilities follow the same layout and
//! register through [`Registry::register_client`].

pub mod arm;
pub mod board;
pub mod camera;
pub mod gantry;
pub mod gripper;
pub mod sensor;

use crate::error::Result;
use crate::resource::Registry;

/// Register every built-in capability. Safe to call more than once.
pub fn register_builtins(registry: &Registry) -> Result<()> {
    registry.register_client::<camera::CameraClient>()?;
    registry.register_client::<gripper::GripperClient>()?;
    registry.register_client::<arm::ArmClient>()?;
    registry.register_client::<gantry::GantryClient>()?;
    registry.register_client::<sensor::SensorClient>()?;
    registry.register_client::<board::BoardClient>()?;
    tracing::debug!(count = registry.registered_apis().len(), "built-in capabilities registered");
    Ok(())
}
