//! Request/response codec used by the proxies.
//!
//! Messages are serde structs encoded as JSON into [`Bytes`]. The transport
//! never looks inside the payload.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ResourceError, Result};

/// Serialize a request body.
pub fn encode<T: Serialize>(message: &T) -> Result<Bytes> {
    serde_json::to_vec(message)
        .map(Bytes::from)
        .map_err(|e| ResourceError::Codec(format!("encode: {}", e)))
}

/// Deserialize a response body.
pub fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    serde_json::from_slice(payload).map_err(|e| ResourceError::Codec(format!("decode: {}", e)))
}

/// `#[serde(with = "base64_bytes")]` for binary fields.
pub mod base64_bytes {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Frame {
        mime_type: String,
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
    }

    #[test]
    fn test_binary_field_survives_the_codec() {
        let frame = Frame {
            mime_type: "image/png".into(),
            data: vec![0x89, 0x50, 0x4e, 0x47],
        };
        let bytes = encode(&frame).unwrap();
        let back: Frame = decode(&bytes).unwrap();
        assert_eq!(back, frame);
    }

    #[test]
    fn test_decode_failure_is_a_codec_error() {
        let err = decode::<Frame>(b"{not json").unwrap_err();
        assert!(matches!(err, ResourceError::Codec(_)));
    }
}
