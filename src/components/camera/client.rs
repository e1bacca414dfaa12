//! Camera proxy over a peer connection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::camera::{self, Camera, Image, NamedImage, PointCloud, Properties};
use crate::common::{Geometry, Kinematics, ResponseMetadata};
use crate::error::Result;
use crate::resource::{Api, CallOptions, Component, InterfaceDefinition, Resource, ResourceName, Struct};
use crate::rpc::{ProxyBase, ResourceClient};

#[derive(Serialize)]
struct GetImageRequest<'a> {
    name: &'a str,
    mime_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<&'a Struct>,
}

#[derive(Deserialize)]
struct GetImagesResponse {
    #[serde(default)]
    images: Vec<NamedImage>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

/// Camera proxy.
#[derive(Debug, Clone)]
pub struct CameraClient {
    base: ProxyBase,
}

impl ResourceClient for CameraClient {
    const API: Api = camera::API;

    fn definition() -> InterfaceDefinition {
        camera::definition()
    }

    fn from_base(base: ProxyBase) -> Self {
        Self { base }
    }

    fn base(&self) -> &ProxyBase {
        &self.base
    }
}

#[async_trait]
impl Resource for CameraClient {
    fn resource_name(&self) -> &ResourceName {
        self.base.resource_name()
    }

    async fn do_command(&self, command: Struct, opts: CallOptions) -> Result<Struct> {
        self.base.do_command(command, &opts).await
    }
}

#[async_trait]
impl Component for CameraClient {
    async fn get_geometries(&self, opts: CallOptions) -> Result<Vec<Geometry>> {
        self.base.get_geometries(&opts).await
    }

    async fn get_kinematics(&self, opts: CallOptions) -> Result<Kinematics> {
        self.base.get_kinematics(&opts).await
    }
}

#[async_trait]
impl Camera for CameraClient {
    async fn get_image(&self, mime_type: &str, opts: CallOptions) -> Result<Image> {
        let request = GetImageRequest {
            name: self.base.resource_name().name(),
            mime_type,
            extra: opts.extra.as_ref(),
        };
        self.base.unary("get_image", &request, &opts).await
    }

    async fn get_images(&self, opts: CallOptions) -> Result<(Vec<NamedImage>, ResponseMetadata)> {
        let response: GetImagesResponse = self
            .base
            .unary("get_images", &self.base.name_request(&opts), &opts)
            .await?;
        Ok((response.images, response.response_metadata))
    }

    async fn get_point_cloud(&self, opts: CallOptions) -> Result<PointCloud> {
        self.base
            .unary("get_point_cloud", &self.base.name_request(&opts), &opts)
            .await
    }

    async fn get_properties(&self, opts: CallOptions) -> Result<Properties> {
        self.base
            .unary("get_properties", &self.base.name_request(&opts), &opts)
            .await
    }
}
