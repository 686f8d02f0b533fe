use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::credential::CredentialContainer;
use crate::error::Error;
use crate::jwt::NumericDate;

pub const ISSUER: &str = "iss";
pub const AUDIENCE: &str = "aud";
pub const ISSUED_AT: &str = "iat";
pub const EXPIRATION: &str = "exp";
pub const VERIFIABLE_PRESENTATION: &str = "vp";

/// Claims computed by the creator. Caller parameters never override them.
pub const RESERVED_CLAIMS: [&str; 4] = [ISSUER, ISSUED_AT, EXPIRATION, VERIFIABLE_PRESENTATION];

pub const PRESENTATION_TYPE: &str = "VerifiablePresentation";

/// Caller-supplied claims, copied into the presentation as-is.
///
/// An empty set of parameters is not the same as no parameters: the former
/// is an invalid request, the latter an unsupported one.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct PresentationParameters(Map<String, Value>);

impl PresentationParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_audience(audience: impl Into<Value>) -> Self {
        let mut parameters = Self::new();
        parameters.insert(AUDIENCE, audience);
        parameters
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// The `aud` claim, if it is a non-empty string or a non-empty array of
    /// non-empty strings.
    pub fn require_audience(&self) -> Result<&Value, Error> {
        let audience = self.get(AUDIENCE).ok_or(Error::MissingClaim(AUDIENCE))?;
        let valid = match audience {
            Value::String(s) => !s.is_empty(),
            Value::Array(values) => {
                !values.is_empty()
                    && values
                        .iter()
                        .all(|v| matches!(v, Value::String(s) if !s.is_empty()))
            }
            _ => false,
        };
        if valid {
            Ok(audience)
        } else {
            Err(Error::InvalidClaim(AUDIENCE))
        }
    }
}

impl From<Map<String, Value>> for PresentationParameters {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for PresentationParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Value of the `vp` claim.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PresentationPayload {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    #[serde(rename = "type")]
    pub type_: String,
    /// Raw credentials, in input order.
    #[serde(rename = "verifiableCredential")]
    pub verifiable_credential: Vec<String>,
}

impl PresentationPayload {
    pub fn new(context: Vec<String>, credentials: &[CredentialContainer]) -> Self {
        Self {
            context,
            type_: PRESENTATION_TYPE.to_string(),
            verifiable_credential: credentials
                .iter()
                .map(|vcc| vcc.raw().to_string())
                .collect(),
        }
    }
}

/// Payload of a JWT presentation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClaimSet {
    #[serde(rename = "iss")]
    pub issuer: String,
    #[serde(rename = "iat")]
    pub issuance_date: NumericDate,
    #[serde(rename = "exp")]
    pub expiration_time: NumericDate,
    #[serde(rename = "vp")]
    pub verifiable_presentation: PresentationPayload,
    /// Pass-through claims, `aud` included.
    #[serde(flatten)]
    pub property_set: Map<String, Value>,
}

impl ClaimSet {
    /// Merges reserved claims with the caller's parameters.
    ///
    /// A parameter named like a reserved claim is dropped.
    pub fn assemble(
        issuer: &str,
        issuance_date: NumericDate,
        expiration_time: NumericDate,
        verifiable_presentation: PresentationPayload,
        parameters: &PresentationParameters,
    ) -> Self {
        let mut property_set = Map::new();
        for (name, value) in parameters.iter() {
            if RESERVED_CLAIMS.contains(&name.as_str()) {
                log::debug!("Ignoring parameter '{}': reserved claim", name);
                continue;
            }
            property_set.insert(name.clone(), value.clone());
        }
        Self {
            issuer: issuer.to_string(),
            issuance_date,
            expiration_time,
            verifiable_presentation,
            property_set,
        }
    }

    pub fn audience(&self) -> Option<&Value> {
        self.property_set.get(AUDIENCE)
    }
}
