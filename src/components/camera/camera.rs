//! Camera capability: images, point clouds and intrinsics.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::codec::base64_bytes;
use crate::common::ResponseMetadata;
use crate::error::Result;
use crate::resource::{Api, CallOptions, Component, InterfaceDefinition};

pub const API: Api = Api::component("camera");
pub const SERVICE: &str = "rdk.component.camera.v1.CameraService";

/// MIME type of the peer's raw depth format.
pub const MIME_TYPE_DEPTH: &str = "image/vnd.rdk.dep";
/// MIME type of PCD point clouds.
pub const MIME_TYPE_PCD: &str = "pointcloud/pcd";

/// Method set of the camera service.
pub fn definition() -> InterfaceDefinition {
    InterfaceDefinition::new(API, SERVICE)
        .mandatory("get_image")
        .mandatory("get_images")
        .mandatory("get_point_cloud")
        .mandatory("get_properties")
}

/// One encoded frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub mime_type: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

/// A frame from one of several imagers captured together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedImage {
    pub source_name: String,
    #[serde(flatten)]
    pub image: Image,
}

/// Point cloud bytes and the format they are encoded in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointCloud {
    pub mime_type: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntrinsicParameters {
    pub width_px: u32,
    pub height_px: u32,
    pub focal_x_px: f64,
    pub focal_y_px: f64,
    pub center_x_px: f64,
    pub center_y_px: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistortionParameters {
    pub model: String,
    #[serde(default)]
    pub parameters: Vec<f64>,
}

/// Static properties of a camera.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    /// Whether the camera can produce point clouds.
    #[serde(default)]
    pub supports_pcd: bool,
    #[serde(default)]
    pub intrinsic_parameters: Option<IntrinsicParameters>,
    #[serde(default)]
    pub distortion_parameters: Option<DistortionParameters>,
    #[serde(default)]
    pub mime_types: Vec<String>,
    #[serde(default)]
    pub frame_rate: Option<f32>,
}

/// A camera: one or more imagers, optionally with depth.
#[async_trait]
pub trait Camera: Component {
    /// The next frame. `mime_type` is a request; the answer may differ.
    async fn get_image(&self, mime_type: &str, opts: CallOptions) -> Result<Image>;

    /// Simultaneous frames from every imager. Not meant for time series of
    /// a single imager.
    async fn get_images(&self, opts: CallOptions) -> Result<(Vec<NamedImage>, ResponseMetadata)>;

    async fn get_point_cloud(&self, opts: CallOptions) -> Result<PointCloud>;

    async fn get_properties(&self, opts: CallOptions) -> Result<Properties>;
}
