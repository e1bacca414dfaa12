//! Gripper capability (`rdk:component:gripper`).

#[allow(clippy::module_inception)]
mod gripper;
mod client;

pub use client::GripperClient;
pub use gripper::{definition, Gripper, HoldingStatus, API, SERVICE};
