use std::fmt;

use base64::{engine::general_purpose, Engine};
use serde::{Serialize, Serializer};

use crate::error::{AppError, AppResult};

/// Raw image bytes. Stored as a BLOB, exchanged as standard base64.
#[derive(Clone, PartialEq, Eq)]
pub struct Photo(Vec<u8>);

impl Photo {
    /// Decode a wire payload. Empty or undecodable input is a validation error.
    pub fn from_base64(encoded: &str) -> AppResult<Self> {
        let bytes = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|_| AppError::Validation("Invalid photo format. Photo must be base64 encoded".into()))?;
        Self::from_bytes(bytes).ok_or_else(|| AppError::Validation("Photo is required".into()))
    }

    /// `None` for an empty buffer.
    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        if bytes.is_empty() {
            None
        } else {
            Some(Self(bytes))
        }
    }

    /// Wrap bytes read back from storage, which were validated on the way in.
    pub(crate) fn from_stored(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.0)
    }
}

impl fmt::Debug for Photo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Photo({} bytes)", self.0.len())
    }
}

impl Serialize for Photo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}
