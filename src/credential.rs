use core::fmt;

use serde::{Deserialize, Serialize};

/// Encoding of a previously issued Verifiable Credential.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CredentialFormat {
    /// VC secured as a JWT.
    #[serde(rename = "JWT")]
    Jwt,
    /// VC secured with an embedded JSON-LD proof.
    #[serde(rename = "JSON_LD")]
    JsonLd,
}

impl CredentialFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jwt => "JWT",
            Self::JsonLd => "JSON_LD",
        }
    }
}

impl fmt::Display for CredentialFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

/// A credential in its original serialized form.
///
/// The raw representation is opaque: it is embedded into presentations as-is,
/// never parsed, reformatted or re-signed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CredentialContainer {
    raw: String,
    format: CredentialFormat,
}

impl CredentialContainer {
    pub fn new(raw: impl Into<String>, format: CredentialFormat) -> Self {
        Self {
            raw: raw.into(),
            format,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn format(&self) -> CredentialFormat {
        self.format
    }

    pub fn into_raw(self) -> String {
        self.raw
    }
}
