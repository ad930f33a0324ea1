//! Payload encodings
//!
//! Frames carry structured text. Client and daemon must be configured with
//! the same codec; nothing on the wire identifies which one is in use.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::{Error, Result};

/// Structured-text serialization used for frame payloads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// JSON via serde_json
    #[default]
    Json,
    /// TOML via the toml crate; payloads must serialize to a table
    Toml,
}

impl Codec {
    /// Serialize a value into payload bytes
    pub fn encode<T: Serialize + ?Sized>(self, value: &T) -> Result<Vec<u8>> {
        match self {
            Self::Json => serde_json::to_vec(value).map_err(|e| Error::Encode(e.to_string())),
            Self::Toml => toml::to_string(value)
                .map(String::into_bytes)
                .map_err(|e| Error::Encode(e.to_string())),
        }
    }

    /// Deserialize payload bytes into a value
    pub fn decode<T: DeserializeOwned>(self, payload: &[u8]) -> Result<T> {
        match self {
            Self::Json => {
                serde_json::from_slice(payload).map_err(|e| Error::MalformedResponse(e.to_string()))
            }
            Self::Toml => {
                let text = std::str::from_utf8(payload)
                    .map_err(|e| Error::MalformedResponse(e.to_string()))?;
                toml::from_str(text).map_err(|e| Error::MalformedResponse(e.to_string()))
            }
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Toml => f.write_str("toml"),
        }
    }
}

impl FromStr for Codec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            other => Err(format!("unknown codec '{other}' (expected json or toml)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Greeting {
        message: String,
    }

    #[test]
    fn test_json_encoding() {
        let bytes = Codec::Json
            .encode(&Greeting {
                message: "hello bob".into(),
            })
            .unwrap();
        assert_eq!(bytes, br#"{"message":"hello bob"}"#);
    }

    #[test]
    fn test_toml_encoding() {
        let value = Greeting {
            message: "hello bob".into(),
        };
        let bytes = Codec::Toml.encode(&value).unwrap();
        assert_eq!(String::from_utf8(bytes.clone()).unwrap().trim(), r#"message = "hello bob""#);
        assert_eq!(Codec::Toml.decode::<Greeting>(&bytes).unwrap(), value);
    }

    #[test]
    fn test_toml_rejects_non_table() {
        let err = Codec::Toml.encode(&42u32).unwrap_err();
        assert!(matches!(err, Error::Encode(_)));
    }

    #[test]
    fn test_invalid_payload_is_malformed() {
        let err = Codec::Json.decode::<Greeting>(b"not json").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));

        let err = Codec::Toml.decode::<Greeting>(&[0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        let err = Codec::Json.decode::<Greeting>(br#"{"name":"bob"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_codec() {
        assert_eq!("JSON".parse::<Codec>().unwrap(), Codec::Json);
        assert_eq!("toml".parse::<Codec>().unwrap(), Codec::Toml);
        assert!("cbor".parse::<Codec>().is_err());
    }
}
