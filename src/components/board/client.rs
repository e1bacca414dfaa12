//! Board proxy, including the streamed tick subscription.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use super::board::{self, AnalogValue, Board, PowerMode, Tick, TickStream};
use crate::common::{Geometry, Kinematics};
use crate::error::Result;
use crate::resource::{Api, CallOptions, Component, InterfaceDefinition, Resource, ResourceName, Struct};
use crate::rpc::{ProxyBase, ResourceClient};

#[derive(Serialize)]
struct PinRequest<'a> {
    name: &'a str,
    pin: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<&'a Struct>,
}

#[derive(Serialize)]
struct SetGpioRequest<'a> {
    name: &'a str,
    pin: &'a str,
    high: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<&'a Struct>,
}

#[derive(Deserialize)]
struct GetGpioResponse {
    high: bool,
}

#[derive(Serialize)]
struct SetPwmRequest<'a> {
    name: &'a str,
    pin: &'a str,
    duty_cycle_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<&'a Struct>,
}

#[derive(Deserialize)]
struct PwmResponse {
    duty_cycle_pct: f64,
}

#[derive(Serialize)]
struct SetPwmFrequencyRequest<'a> {
    name: &'a str,
    pin: &'a str,
    frequency_hz: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<&'a Struct>,
}

#[derive(Deserialize)]
struct PwmFrequencyResponse {
    frequency_hz: u64,
}

#[derive(Serialize)]
struct ReadAnalogRequest<'a> {
    board_name: &'a str,
    analog_reader_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<&'a Struct>,
}

#[derive(Serialize)]
struct WriteAnalogRequest<'a> {
    name: &'a str,
    pin: &'a str,
    value: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<&'a Struct>,
}

#[derive(Serialize)]
struct SetPowerModeRequest<'a> {
    name: &'a str,
    power_mode: PowerMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<&'a Struct>,
}

#[derive(Serialize)]
struct StreamTicksRequest<'a> {
    name: &'a str,
    pin_names: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<&'a Struct>,
}

/// Milliseconds in `d`, saturating at `u64::MAX`.
fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[derive(Debug, Clone)]
pub struct BoardClient {
    base: ProxyBase,
}

impl BoardClient {
    fn board_name(&self) -> &str {
        self.base.resource_name().name()
    }
}

impl ResourceClient for BoardClient {
    const API: Api = board::API;

    fn definition() -> InterfaceDefinition {
        board::definition()
    }

    fn from_base(base: ProxyBase) -> Self {
        Self { base }
    }

    fn base(&self) -> &ProxyBase {
        &self.base
    }
}

#[async_trait]
impl Resource for BoardClient {
    fn resource_name(&self) -> &ResourceName {
        self.base.resource_name()
    }

    async fn do_command(&self, command: Struct, opts: CallOptions) -> Result<Struct> {
        self.base.do_command(command, &opts).await
    }
}

#[async_trait]
impl Component for BoardClient {
    async fn get_geometries(&self, opts: CallOptions) -> Result<Vec<Geometry>> {
        self.base.get_geometries(&opts).await
    }

    async fn get_kinematics(&self, opts: CallOptions) -> Result<Kinematics> {
        self.base.get_kinematics(&opts).await
    }
}

#[async_trait]
impl Board for BoardClient {
    async fn set_gpio(&self, pin: &str, high: bool, opts: CallOptions) -> Result<()> {
        let request = SetGpioRequest {
            name: self.board_name(),
            pin,
            high,
            extra: opts.extra.as_ref(),
        };
        self.base.unary_void("set_gpio", &request, &opts).await
    }

    async fn get_gpio(&self, pin: &str, opts: CallOptions) -> Result<bool> {
        let request = PinRequest {
            name: self.board_name(),
            pin,
            extra: opts.extra.as_ref(),
        };
        let response: GetGpioResponse = self.base.unary("get_gpio", &request, &opts).await?;
        Ok(response.high)
    }

    async fn get_pwm(&self, pin: &str, opts: CallOptions) -> Result<f64> {
        let request = PinRequest {
            name: self.board_name(),
            pin,
            extra: opts.extra.as_ref(),
        };
        let response: PwmResponse = self.base.unary("get_pwm", &request, &opts).await?;
        Ok(response.duty_cycle_pct)
    }

    async fn set_pwm(&self, pin: &str, duty_cycle_pct: f64, opts: CallOptions) -> Result<()> {
        let request = SetPwmRequest {
            name: self.board_name(),
            pin,
            duty_cycle_pct,
            extra: opts.extra.as_ref(),
        };
        self.base.unary_void("set_pwm", &request, &opts).await
    }

    async fn get_pwm_frequency(&self, pin: &str, opts: CallOptions) -> Result<u64> {
        let request = PinRequest {
            name: self.board_name(),
            pin,
            extra: opts.extra.as_ref(),
        };
        let response: PwmFrequencyResponse = self
            .base
            .unary("get_pwm_frequency", &request, &opts)
            .await?;
        Ok(response.frequency_hz)
    }

    async fn set_pwm_frequency(&self, pin: &str, frequency_hz: u64, opts: CallOptions) -> Result<()> {
        let request = SetPwmFrequencyRequest {
            name: self.board_name(),
            pin,
            frequency_hz,
            extra: opts.extra.as_ref(),
        };
        self.base
            .unary_void("set_pwm_frequency", &request, &opts)
            .await
    }

    async fn read_analog(&self, reader: &str, opts: CallOptions) -> Result<AnalogValue> {
        let request = ReadAnalogRequest {
            board_name: self.board_name(),
            analog_reader_name: reader,
            extra: opts.extra.as_ref(),
        };
        self.base.unary("read_analog", &request, &opts).await
    }

    async fn write_analog(&self, pin: &str, value: i32, opts: CallOptions) -> Result<()> {
        let request = WriteAnalogRequest {
            name: self.board_name(),
            pin,
            value,
            extra: opts.extra.as_ref(),
        };
        self.base.unary_void("write_analog", &request, &opts).await
    }

    async fn set_power_mode(&self, mode: PowerMode, duration: Option<Duration>, opts: CallOptions) -> Result<()> {
        let request = SetPowerModeRequest {
            name: self.board_name(),
            power_mode: mode,
            duration_ms: duration.map(duration_millis),
            extra: opts.extra.as_ref(),
        };
        self.base.unary_void("set_power_mode", &request, &opts).await
    }

    async fn stream_ticks(&self, pin_names: Vec<String>, opts: CallOptions) -> Result<TickStream> {
        let request = StreamTicksRequest {
            name: self.board_name(),
            pin_names: &pin_names,
            extra: opts.extra.as_ref(),
        };
        let stream = self
            .base
            .server_stream::<_, Tick>("stream_ticks", &request, &opts)
            .await?;
        Ok(stream.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResourceError;
    use crate::testing::MockPeer;
    use serde_json::json;
    use std::sync::Arc;

    fn client(peer: &Arc<MockPeer>) -> BoardClient {
        BoardClient::from_base(ProxyBase::new(
            board::API.resource_name("board"),
            board::SERVICE,
            peer.clone(),
        ))
    }

    fn ticks(n: u64) -> Vec<serde_json::Value> {
        (0..n)
            .map(|i| json!({"pin_name": "pin1", "high": i % 2 == 0, "time_ns": 1000 + i}))
            .collect()
    }

    #[tokio::test]
    async fn test_gpio() {
        let peer = Arc::new(MockPeer::new());
        peer.respond("set_gpio", json!({}));
        peer.respond("get_gpio", json!({"high": true}));
        let board = client(&peer);

        board.set_gpio("18", true, CallOptions::default()).await.unwrap();
        let body = peer.last_request_body();
        assert_eq!(body["pin"], "18");
        assert_eq!(body["high"], true);

        assert!(board.get_gpio("18", CallOptions::default()).await.unwrap());
    }

    #[tokio::test]
    async fn test_pwm() {
        let peer = Arc::new(MockPeer::new());
        peer.respond("get_pwm", json!({"duty_cycle_pct": 0.0}));
        peer.respond("set_pwm", json!({}));
        peer.respond("get_pwm_frequency", json!({"frequency_hz": 0}));
        peer.respond("set_pwm_frequency", json!({}));
        let board = client(&peer);
        let mut extra = Struct::new();
        extra.insert("foo".into(), json!("bar"));
        extra.insert("baz".into(), json!([1, 2, 3]));
        let opts = CallOptions::new()
            .with_extra(extra)
            .with_timeout(Duration::from_millis(7860));

        assert_eq!(board.get_pwm("pin1", opts.clone()).await.unwrap(), 0.0);
        let body = peer.last_request_body();
        assert_eq!(body["pin"], "pin1");
        assert_eq!(body["extra"]["baz"], json!([1, 2, 3]));
        assert_eq!(peer.calls()[0].timeout, Some(Duration::from_millis(7860)));

        board.set_pwm("pin1", 12.3, opts.clone()).await.unwrap();
        assert_eq!(peer.last_request_body()["duty_cycle_pct"], 12.3);

        assert_eq!(board.get_pwm_frequency("pin1", opts.clone()).await.unwrap(), 0);

        board.set_pwm_frequency("pin1", 123, opts).await.unwrap();
        let body = peer.last_request_body();
        assert_eq!(body["frequency_hz"], 123);
        assert_eq!(body["name"], "board");

        let methods: Vec<String> = peer.calls().into_iter().map(|c| c.method).collect();
        assert_eq!(methods, vec!["get_pwm", "set_pwm", "get_pwm_frequency", "set_pwm_frequency"]);
    }

    #[test]
    fn test_duration_millis_saturates() {
        assert_eq!(duration_millis(Duration::from_secs(2)), 2000);
        assert_eq!(duration_millis(Duration::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn test_analog() {
        let peer = Arc::new(MockPeer::new());
        peer.respond(
            "read_analog",
            json!({"value": 42, "min_range": 0.0, "max_range": 5.0, "step_size": 0.25}),
        );
        peer.respond("write_analog", json!({}));
        let board = client(&peer);

        let reading = board.read_analog("a1", CallOptions::default()).await.unwrap();
        assert_eq!(reading.value, 42);
        assert_eq!(reading.max_range, 5.0);
        assert_eq!(peer.last_request_body()["analog_reader_name"], "a1");

        board.write_analog("pwm", 7, CallOptions::default()).await.unwrap();
        assert_eq!(peer.last_request_body()["value"], 7);
    }

    #[tokio::test]
    async fn test_set_power_mode() {
        let peer = Arc::new(MockPeer::new());
        peer.respond("set_power_mode", json!({}));
        client(&peer)
            .set_power_mode(
                PowerMode::OfflineDeep,
                Some(Duration::from_secs(2)),
                CallOptions::default(),
            )
            .await
            .unwrap();
        let body = peer.last_request_body();
        assert_eq!(body["power_mode"], "offline_deep");
        assert_eq!(body["duration_ms"], 2000);
    }

    #[tokio::test]
    async fn test_stream_ticks_in_order() {
        let peer = Arc::new(MockPeer::new());
        peer.stream("stream_ticks", ticks(4));
        let board = client(&peer);

        let stream = board
            .stream_ticks(vec!["pin1".into()], CallOptions::default())
            .await
            .unwrap();
        let received: Vec<Tick> = stream.map(|t| t.unwrap()).collect().await;
        assert_eq!(received.len(), 4);
        assert!(received.windows(2).all(|w| w[0].time_ns < w[1].time_ns));
        assert_eq!(peer.last_request_body()["pin_names"], json!(["pin1"]));
    }

    #[tokio::test]
    async fn test_dropping_tick_stream_cancels_call() {
        let peer = Arc::new(MockPeer::new());
        peer.stream("stream_ticks", ticks(10));
        let board = client(&peer);

        let mut stream = board
            .stream_ticks(vec!["pin1".into()], CallOptions::default())
            .await
            .unwrap();
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.time_ns, 1000);
        drop(stream);

        peer.wait_for_cancellation().await;
        assert_eq!(peer.cancellations(), 1);
        assert!(peer.produced() < 10);
    }

    #[tokio::test]
    async fn test_tick_stream_ends_when_proxy_invalidated() {
        let peer = Arc::new(MockPeer::new());
        peer.stream("stream_ticks", ticks(5));
        let board = client(&peer);

        let mut stream = board
            .stream_ticks(vec!["pin1".into()], CallOptions::default())
            .await
            .unwrap();
        assert!(stream.next().await.unwrap().is_ok());

        board.base().invalidate();
        let err = stream.next().await.unwrap().unwrap_err();
        assert!(matches!(err, ResourceError::ResourceNoLongerAvailable(_)));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_ticks_on_invalid_proxy_never_reaches_peer() {
        let peer = Arc::new(MockPeer::new());
        peer.stream("stream_ticks", ticks(3));
        let board = client(&peer);
        board.base().invalidate();

        let err = board
            .stream_ticks(vec![], CallOptions::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ResourceError::ResourceNoLongerAvailable(_)));
        assert!(peer.calls().is_empty());
    }

    #[test]
    fn test_definition_marks_streaming() {
        use crate::resource::CallKind;
        let def = BoardClient::definition();
        assert_eq!(def.method("stream_ticks").unwrap().kind, CallKind::ServerStreaming);
        assert!(def.is_optional("set_power_mode"));
        assert!(!def.is_optional("set_pwm_frequency"));
    }
}
