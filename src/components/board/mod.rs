//! Board capability (`rdk:component:board`).

#[allow(clippy::module_inception)]
mod board;
mod client;

pub use board::{definition, AnalogValue, Board, PowerMode, Tick, TickStream, API, SERVICE};
pub use client::BoardClient;
