//! Text encodings and write payloads.

use std::fmt;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::{VfsError, VfsResult};

/// How text crosses the boundary between callers and stored bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// UTF-8 text. Invalid sequences are replaced when reading.
    #[default]
    Utf8,
    /// Standard base64 with padding.
    Base64,
    /// Lowercase hexadecimal.
    Hex,
    /// One character per byte (ISO-8859-1).
    Latin1,
}

impl Encoding {
    /// Canonical name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Utf8 => "utf8",
            Self::Base64 => "base64",
            Self::Hex => "hex",
            Self::Latin1 => "latin1",
        }
    }

    /// Turn caller-supplied text into the bytes to store.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::Encoding` if the text is not valid for this encoding.
    pub fn decode(self, text: &str) -> VfsResult<Vec<u8>> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Base64 => STANDARD
                .decode(text.trim())
                .map_err(|e| VfsError::Encoding(format!("invalid base64: {e}"))),
            Self::Hex => {
                hex::decode(text.trim()).map_err(|e| VfsError::Encoding(format!("invalid hex: {e}")))
            },
            Self::Latin1 => text
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c)).map_err(|_| {
                        VfsError::Encoding(format!("character {c:?} is outside latin1"))
                    })
                })
                .collect(),
        }
    }

    /// Render stored bytes as text.
    #[must_use]
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Base64 => STANDARD.encode(bytes),
            Self::Hex => hex::encode(bytes),
            Self::Latin1 => bytes.iter().copied().map(char::from).collect(),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = VfsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "base64" => Ok(Self::Base64),
            "hex" => Ok(Self::Hex),
            "latin1" | "binary" => Ok(Self::Latin1),
            other => Err(VfsError::Encoding(format!("unknown encoding '{other}'"))),
        }
    }
}

/// Payload for [`ScopedVfs::write`](crate::ScopedVfs::write).
///
/// Only `Structured` triggers serialization: the value is written as
/// pretty-printed JSON regardless of the requested encoding. `Text` goes
/// through the encoding, `Bytes` is stored verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteContent {
    /// Text interpreted with the write's [`Encoding`].
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Structured value serialized to formatted JSON text.
    Structured(serde_json::Value),
}

impl WriteContent {
    /// Produce the bytes to store.
    ///
    /// # Errors
    ///
    /// Returns an encoding or serialization error.
    pub fn into_bytes(self, encoding: Encoding) -> VfsResult<Vec<u8>> {
        match self {
            Self::Text(text) => encoding.decode(&text),
            Self::Bytes(bytes) => Ok(bytes),
            Self::Structured(value) => Ok(serde_json::to_string_pretty(&value)?.into_bytes()),
        }
    }
}

impl From<String> for WriteContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for WriteContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<u8>> for WriteContent {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<serde_json::Value> for WriteContent {
    /// Strings stay text; every other JSON value is structured.
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => Self::Text(text),
            other => Self::Structured(other),
        }
    }
}
