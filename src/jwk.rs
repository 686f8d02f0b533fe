use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::Error;

// RFC 7517 - JSON Web Key (JWK)
// RFC 7518 - JSON Web Algorithms (JWA)
// RFC 8037 - CFRG ECDH and Signatures in JOSE

pub const P256: &str = "P-256";
pub const P384: &str = "P-384";
pub const SECP256K1: &str = "secp256k1";
pub const ED25519: &str = "Ed25519";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct JWK {
    #[serde(rename = "use")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_use: Option<String>,
    #[serde(rename = "key_ops")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_operations: Option<Vec<String>>,
    #[serde(rename = "alg")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<Algorithm>,
    #[serde(rename = "kid")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(flatten)]
    pub params: Params,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "kty")]
pub enum Params {
    EC(ECParams),
    OKP(OctetParams),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Zeroize)]
pub struct ECParams {
    // Parameters for Elliptic Curve Public Keys
    #[serde(rename = "crv")]
    pub curve: Option<String>,
    #[serde(rename = "x")]
    pub x_coordinate: Option<Base64urlUInt>,
    #[serde(rename = "y")]
    pub y_coordinate: Option<Base64urlUInt>,

    // Parameters for Elliptic Curve Private Keys
    #[serde(rename = "d")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecc_private_key: Option<Base64urlUInt>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Zeroize)]
pub struct OctetParams {
    // Parameters for Octet Key Pair Public Keys
    #[serde(rename = "crv")]
    pub curve: String,
    #[serde(rename = "x")]
    pub public_key: Base64urlUInt,

    // Parameters for Octet Key Pair Private Keys
    #[serde(rename = "d")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<Base64urlUInt>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Zeroize)]
#[serde(try_from = "String")]
#[serde(into = "Base64urlUIntString")]
pub struct Base64urlUInt(pub Vec<u8>);

type Base64urlUIntString = String;

/// JWK Set.
///
/// Keys of a type or shape not understood here are skipped when
/// deserializing, as RFC 7517 recommends.
///
/// See: <https://www.rfc-editor.org/rfc/rfc7517#section-5>
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UncheckedJwkSet")]
pub struct JwkSet {
    pub keys: Vec<JWK>,
}

#[derive(Deserialize)]
struct UncheckedJwkSet {
    keys: Vec<serde_json::Value>,
}

impl From<UncheckedJwkSet> for JwkSet {
    fn from(set: UncheckedJwkSet) -> Self {
        let keys = set
            .keys
            .into_iter()
            .filter_map(|value| match JWK::try_from(value) {
                Ok(key) => Some(key),
                Err(e) => {
                    log::warn!("Skipping unsupported JWK in set: {}", e);
                    None
                }
            })
            .collect();
        Self { keys }
    }
}

/// Signature algorithm.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Hash, Eq, Default)]
pub enum Algorithm {
    /// ECDSA using P-256 and SHA-256.
    ES256,
    /// ECDSA using P-384 and SHA-384.
    ES384,
    /// ECDSA using secp256k1 and SHA-256.
    ///
    /// See: <https://www.rfc-editor.org/rfc/rfc8812#section-3.2>
    ES256K,
    /// Edwards-curve Digital Signature Algorithm.
    EdDSA,
    /// No signature.
    #[default]
    #[serde(alias = "None", rename = "none")]
    None,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ES256 => "ES256",
            Self::ES384 => "ES384",
            Self::ES256K => "ES256K",
            Self::EdDSA => "EdDSA",
            Self::None => "none",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl FromStr for JWK {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}

impl TryFrom<serde_json::Value> for JWK {
    type Error = serde_json::Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}

impl From<Params> for JWK {
    fn from(params: Params) -> Self {
        Self {
            public_key_use: None,
            key_operations: None,
            algorithm: None,
            key_id: None,
            params,
        }
    }
}

impl JWK {
    /// Strip private key material
    pub fn to_public(&self) -> Self {
        let mut key = self.clone();
        key.params = key.params.to_public();
        key
    }

    pub fn is_public(&self) -> bool {
        self.params.is_public()
    }

    /// Curve name of the key, as found in the `crv` parameter.
    pub fn curve(&self) -> Option<&str> {
        match &self.params {
            Params::EC(ec) => ec.curve.as_deref(),
            Params::OKP(okp) => Some(&okp.curve),
        }
    }

    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    #[cfg(feature = "secp256r1")]
    pub fn generate_p256() -> Self {
        let mut rng = rand::rngs::OsRng {};
        let secret_key = p256::SecretKey::random(&mut rng);
        Self::from(Params::EC(ECParams::from(&secret_key)))
    }

    #[cfg(feature = "secp384r1")]
    pub fn generate_p384() -> Self {
        let mut rng = rand::rngs::OsRng {};
        let secret_key = p384::SecretKey::random(&mut rng);
        Self::from(Params::EC(ECParams::from(&secret_key)))
    }

    #[cfg(feature = "secp256k1")]
    pub fn generate_secp256k1() -> Self {
        let mut rng = rand::rngs::OsRng {};
        let secret_key = k256::SecretKey::random(&mut rng);
        Self::from(Params::EC(ECParams::from(&secret_key)))
    }

    #[cfg(feature = "ed25519")]
    pub fn generate_ed25519() -> Self {
        let mut rng = rand::rngs::OsRng {};
        let signing_key = ed25519_dalek::SigningKey::generate(&mut rng);
        Self::from(Params::OKP(OctetParams::from(&signing_key)))
    }
}

impl Params {
    pub fn is_public(&self) -> bool {
        match self {
            Self::EC(params) => params.ecc_private_key.is_none(),
            Self::OKP(params) => params.private_key.is_none(),
        }
    }

    /// Strip private key material
    pub fn to_public(&self) -> Self {
        match self {
            Self::EC(params) => Self::EC(params.to_public()),
            Self::OKP(params) => Self::OKP(params.to_public()),
        }
    }
}

impl ECParams {
    /// Strip private key material
    pub fn to_public(&self) -> Self {
        Self {
            curve: self.curve.clone(),
            x_coordinate: self.x_coordinate.clone(),
            y_coordinate: self.y_coordinate.clone(),
            ecc_private_key: None,
        }
    }

    /// Checks the `crv` parameter and returns the uncompressed SEC1 point.
    fn uncompressed_point(&self, expected_curve: &str) -> Result<Vec<u8>, Error> {
        let curve = self.curve.as_ref().ok_or(Error::MissingCurve)?;
        if curve != expected_curve {
            return Err(Error::CurveNotImplemented(curve.to_string()));
        }
        const EC_UNCOMPRESSED_POINT_TAG: &[u8] = &[0x04];
        let x = &self.x_coordinate.as_ref().ok_or(Error::MissingPoint)?.0;
        let y = &self.y_coordinate.as_ref().ok_or(Error::MissingPoint)?.0;
        Ok([EC_UNCOMPRESSED_POINT_TAG, x.as_slice(), y.as_slice()].concat())
    }

    /// Checks the `crv` parameter and returns the private scalar bytes.
    fn private_scalar(&self, expected_curve: &str) -> Result<&[u8], Error> {
        let curve = self.curve.as_ref().ok_or(Error::MissingCurve)?;
        if curve != expected_curve {
            return Err(Error::CurveNotImplemented(curve.to_string()));
        }
        let private_key = self
            .ecc_private_key
            .as_ref()
            .ok_or(Error::MissingPrivateKey)?;
        Ok(&private_key.0)
    }
}

impl OctetParams {
    /// Strip private key material
    pub fn to_public(&self) -> Self {
        Self {
            curve: self.curve.clone(),
            public_key: self.public_key.clone(),
            private_key: None,
        }
    }
}

macro_rules! ec_curve {
    ($feature:literal, $krate:ident, $name:ident) => {
        #[cfg(feature = $feature)]
        impl TryFrom<&ECParams> for $krate::SecretKey {
            type Error = Error;
            fn try_from(params: &ECParams) -> Result<Self, Self::Error> {
                let d = params.private_scalar($name)?;
                $krate::SecretKey::from_slice(d).map_err(|_| Error::KeyRejected)
            }
        }

        #[cfg(feature = $feature)]
        impl TryFrom<&ECParams> for $krate::PublicKey {
            type Error = Error;
            fn try_from(params: &ECParams) -> Result<Self, Self::Error> {
                let pk_data = params.uncompressed_point($name)?;
                $krate::PublicKey::from_sec1_bytes(&pk_data).map_err(|_| Error::KeyRejected)
            }
        }

        #[cfg(feature = $feature)]
        impl From<&$krate::PublicKey> for ECParams {
            fn from(pk: &$krate::PublicKey) -> Self {
                use $krate::elliptic_curve::sec1::ToEncodedPoint;
                let encoded_point = pk.to_encoded_point(false);
                ECParams {
                    curve: Some($name.to_string()),
                    x_coordinate: encoded_point.x().map(|x| Base64urlUInt(x.to_vec())),
                    y_coordinate: encoded_point.y().map(|y| Base64urlUInt(y.to_vec())),
                    ecc_private_key: None,
                }
            }
        }

        #[cfg(feature = $feature)]
        impl From<&$krate::SecretKey> for ECParams {
            fn from(k: &$krate::SecretKey) -> Self {
                let sk_bytes = zeroize::Zeroizing::new(k.to_bytes().to_vec());
                ECParams {
                    ecc_private_key: Some(Base64urlUInt(sk_bytes.to_vec())),
                    ..ECParams::from(&k.public_key())
                }
            }
        }
    };
}

ec_curve!("secp256r1", p256, P256);
ec_curve!("secp384r1", p384, P384);
ec_curve!("secp256k1", k256, SECP256K1);

#[cfg(feature = "ed25519")]
impl TryFrom<&OctetParams> for ed25519_dalek::SigningKey {
    type Error = Error;
    fn try_from(params: &OctetParams) -> Result<Self, Self::Error> {
        if params.curve != ED25519 {
            return Err(Error::CurveNotImplemented(params.curve.to_string()));
        }
        let private_key = params.private_key.as_ref().ok_or(Error::MissingPrivateKey)?;
        let bytes: &[u8; ed25519_dalek::SECRET_KEY_LENGTH] = private_key
            .0
            .as_slice()
            .try_into()
            .map_err(|_| Error::KeyRejected)?;
        Ok(ed25519_dalek::SigningKey::from_bytes(bytes))
    }
}

#[cfg(feature = "ed25519")]
impl TryFrom<&OctetParams> for ed25519_dalek::VerifyingKey {
    type Error = Error;
    fn try_from(params: &OctetParams) -> Result<Self, Self::Error> {
        if params.curve != ED25519 {
            return Err(Error::CurveNotImplemented(params.curve.to_string()));
        }
        let bytes: &[u8; ed25519_dalek::PUBLIC_KEY_LENGTH] = params
            .public_key
            .0
            .as_slice()
            .try_into()
            .map_err(|_| Error::KeyRejected)?;
        ed25519_dalek::VerifyingKey::from_bytes(bytes).map_err(|_| Error::KeyRejected)
    }
}

#[cfg(feature = "ed25519")]
impl From<&ed25519_dalek::SigningKey> for OctetParams {
    fn from(key: &ed25519_dalek::SigningKey) -> Self {
        OctetParams {
            curve: ED25519.to_string(),
            public_key: Base64urlUInt(key.verifying_key().to_bytes().to_vec()),
            private_key: Some(Base64urlUInt(key.to_bytes().to_vec())),
        }
    }
}

impl TryFrom<String> for Base64urlUInt {
    type Error = base64::DecodeError;
    fn try_from(data: String) -> Result<Self, Self::Error> {
        Ok(Base64urlUInt(base64::decode_config(
            data,
            base64::URL_SAFE_NO_PAD,
        )?))
    }
}

impl From<&Base64urlUInt> for String {
    fn from(data: &Base64urlUInt) -> String {
        base64::encode_config(&data.0, base64::URL_SAFE_NO_PAD)
    }
}

impl From<Base64urlUInt> for Base64urlUIntString {
    fn from(data: Base64urlUInt) -> Base64urlUIntString {
        String::from(&data)
    }
}
