//! Document kinds and the shared JSON codec

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ModelError;

/// Kind of a migratable document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentKind {
    /// Dashboard (widget tree + template variables)
    Dashboard,
    /// Monitor (query + name + message)
    Monitor,
}

impl DocumentKind {
    /// All kinds, in a stable order
    pub const ALL: [Self; 2] = [Self::Dashboard, Self::Monitor];

    /// Name used in object file names and log lines
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Monitor => "monitor",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dashboard" => Ok(Self::Dashboard),
            "monitor" => Ok(Self::Monitor),
            other => Err(ModelError::UnknownKind(other.to_string())),
        }
    }
}

/// A document that can be decoded from and encoded to JSON
pub trait Document: Serialize + DeserializeOwned + Clone {
    /// Kind of this document
    const KIND: DocumentKind;

    /// Decode from JSON text
    ///
    /// # Errors
    /// Returns error if the text is not a valid document of this kind
    fn from_json(content: &str) -> Result<Self, ModelError> {
        serde_json::from_str(content).map_err(|source| ModelError::Deserialize {
            kind: Self::KIND,
            source,
        })
    }

    /// Decode from JSON bytes
    ///
    /// # Errors
    /// Returns error if the bytes are not a valid document of this kind
    fn from_json_slice(content: &[u8]) -> Result<Self, ModelError> {
        serde_json::from_slice(content).map_err(|source| ModelError::Deserialize {
            kind: Self::KIND,
            source,
        })
    }

    /// Encode as tab-indented JSON
    ///
    /// # Errors
    /// Returns error if encoding fails
    fn to_json_pretty(&self) -> Result<String, ModelError> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut ser).map_err(|source| ModelError::Serialize {
            kind: Self::KIND,
            source,
        })?;
        // serde_json only ever writes valid UTF-8
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}
