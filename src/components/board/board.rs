//! Board capability: GPIO pins, PWM, analog readers, digital interrupts and power modes.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resource::{Api, CallOptions, Component, InterfaceDefinition};

pub const API: Api = Api::component("board");
pub const SERVICE: &str = "rdk.component.board.v1.BoardService";

/// Method set of the board service.
pub fn definition() -> InterfaceDefinition {
    InterfaceDefinition::new(API, SERVICE)
        .mandatory("set_gpio")
        .mandatory("get_gpio")
        .mandatory("get_pwm")
        .mandatory("set_pwm")
        .mandatory("get_pwm_frequency")
        .mandatory("set_pwm_frequency")
        .mandatory("read_analog")
        .mandatory("write_analog")
        .optional("set_power_mode")
        .streaming("stream_ticks")
}

/// One reading from an analog pin, with the converter's range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalogValue {
    pub value: i32,
    #[serde(default)]
    pub min_range: f32,
    #[serde(default)]
    pub max_range: f32,
    #[serde(default)]
    pub step_size: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerMode {
    #[default]
    Unspecified,
    Normal,
    OfflineDeep,
}

/// A digital interrupt firing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub pin_name: String,
    /// Level of the pin after the edge.
    pub high: bool,
    /// Board clock, nanoseconds.
    pub time_ns: u64,
}

/// Ticks in arrival order. Dropping the stream ends the subscription.
pub type TickStream = BoxStream<'static, Result<Tick>>;

#[async_trait]
pub trait Board: Component {
    async fn set_gpio(&self, pin: &str, high: bool, opts: CallOptions) -> Result<()>;

    async fn get_gpio(&self, pin: &str, opts: CallOptions) -> Result<bool>;

    /// PWM duty cycle of a GPIO pin, in percent.
    async fn get_pwm(&self, pin: &str, opts: CallOptions) -> Result<f64>;

    async fn set_pwm(&self, pin: &str, duty_cycle_pct: f64, opts: CallOptions) -> Result<()>;

    /// PWM frequency of a GPIO pin, in Hz.
    async fn get_pwm_frequency(&self, pin: &str, opts: CallOptions) -> Result<u64>;

    async fn set_pwm_frequency(&self, pin: &str, frequency_hz: u64, opts: CallOptions) -> Result<()>;

    async fn read_analog(&self, reader: &str, opts: CallOptions) -> Result<AnalogValue>;

    async fn write_analog(&self, pin: &str, value: i32, opts: CallOptions) -> Result<()>;

    /// Switch power mode, for `duration` if given.
    async fn set_power_mode(&self, _mode: PowerMode, _duration: Option<Duration>, _opts: CallOptions) -> Result<()> {
        Err(crate::error::ResourceError::not_implemented("set_power_mode"))
    }

    /// Ticks from the named digital interrupts until the stream is dropped.
    async fn stream_ticks(&self, pin_names: Vec<String>, opts: CallOptions) -> Result<TickStream>;
}
