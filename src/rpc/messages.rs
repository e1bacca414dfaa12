//! Request/response bodies shared by every capability.

use serde::{Deserialize, Serialize};

use crate::common::Geometry;
use crate::resource::Struct;

/// Body of every method that takes only the resource name and `extra`.
#[derive(Debug, Serialize)]
pub struct NameRequest<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<&'a Struct>,
}

#[derive(Debug, Serialize)]
pub struct DoCommandRequest<'a> {
    pub name: &'a str,
    pub command: &'a Struct,
}

#[derive(Debug, Deserialize)]
pub struct DoCommandResponse {
    #[serde(default)]
    pub result: Struct,
}

#[derive(Debug, Deserialize)]
pub struct GetGeometriesResponse {
    #[serde(default)]
    pub geometries: Vec<Geometry>,
}

/// Carries only the name; `is_moving` takes no `extra`.
#[derive(Debug, Serialize)]
pub struct IsMovingRequest<'a> {
    pub name: &'a str,
}

/// `{"is_moving": bool}`, answered by every actuator.
#[derive(Debug, Deserialize)]
pub struct IsMovingResponse {
    pub is_moving: bool,
}
