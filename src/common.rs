//! Spatial and kinematic types shared by the component capabilities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::base64_bytes;

/// A point or direction in millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Position plus orientation vector (`o_x`, `o_y`, `o_z`) and rotation
/// `theta` in degrees about that vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub o_x: f64,
    pub o_y: f64,
    pub o_z: f64,
    pub theta: f64,
}

impl Default for Pose {
    /// The identity pose: origin, pointing along +Z.
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            o_x: 0.0,
            o_y: 0.0,
            o_z: 1.0,
            theta: 0.0,
        }
    }
}

/// Shape of a geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeometryKind {
    Sphere { radius_mm: f64 },
    #[serde(rename = "box")]
    Cuboid { dims_mm: Vector3 },
    Capsule { radius_mm: f64, length_mm: f64 },
}

/// A labelled shape centred at a pose in the component's frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub center: Pose,
    #[serde(flatten)]
    pub kind: GeometryKind,
    #[serde(default)]
    pub label: String,
}

/// Format of a kinematics file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KinematicsFileFormat {
    #[default]
    Unspecified,
    /// Spatial vector algebra parameters.
    Sva,
    Urdf,
}

/// A kinematics file and its format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kinematics {
    pub format: KinematicsFileFormat,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl Kinematics {
    /// Kinematics file of the given format.
    pub fn new(format: KinematicsFileFormat, data: Vec<u8>) -> Self {
        Self { format, data }
    }
}

/// Metadata the peer attaches to a captured response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_wire_shape() {
        let geometry = Geometry {
            center: Pose::default(),
            kind: GeometryKind::Sphere { radius_mm: 2.5 },
            label: "tip".into(),
        };
        let json = serde_json::to_value(&geometry).unwrap();
        assert_eq!(json["type"], "sphere");
        assert_eq!(json["radius_mm"], 2.5);
        let back: Geometry = serde_json::from_value(json).unwrap();
        assert_eq!(back, geometry);
    }

    #[test]
    fn test_kinematics_data_is_base64() {
        let kinematics = Kinematics::new(KinematicsFileFormat::Sva, vec![0, 1, 2]);
        let json = serde_json::to_value(&kinematics).unwrap();
        assert_eq!(json["format"], "sva");
        assert_eq!(json["data"], "AAEC");
    }
}
