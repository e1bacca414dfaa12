//! Arm capability (`rdk:component:arm`).

#[allow(clippy::module_inception)]
mod arm;
mod client;

pub use arm::{definition, Arm, JointPositions, API, SERVICE};
pub use client::ArmClient;
