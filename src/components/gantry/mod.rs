//! Gantry capability (`rdk:component:gantry`).

mod client;
#[allow(clippy::module_inception)]
mod gantry;

pub use client::GantryClient;
pub use gantry::{definition, Gantry, API, SERVICE};
