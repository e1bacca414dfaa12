//! Camera capability (`rdk:component:camera`).

#[allow(clippy::module_inception)]
mod camera;
mod client;

pub use camera::{
    definition, Camera, DistortionParameters, Image, IntrinsicParameters, NamedImage, PointCloud,
    Properties, API, MIME_TYPE_DEPTH, MIME_TYPE_PCD, SERVICE,
};
pub use client::CameraClient;
