use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::jwk::{self, Algorithm, Params, JWK};

/// Cryptographic family of a signing key.
///
/// The family, not the concrete key type, decides which signature algorithm
/// applies (see [`AlgorithmSelector`](crate::AlgorithmSelector)).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyFamily {
    #[serde(rename = "P-256")]
    P256,
    #[serde(rename = "P-384")]
    P384,
    #[serde(rename = "secp256k1")]
    Secp256k1,
    #[serde(rename = "Ed25519")]
    Ed25519,
}

impl KeyFamily {
    pub const ALL: [KeyFamily; 4] = [
        KeyFamily::P256,
        KeyFamily::P384,
        KeyFamily::Secp256k1,
        KeyFamily::Ed25519,
    ];

    /// Curve name, as used in the JWK `crv` parameter.
    pub fn curve_name(&self) -> &'static str {
        match self {
            Self::P256 => jwk::P256,
            Self::P384 => jwk::P384,
            Self::Secp256k1 => jwk::SECP256K1,
            Self::Ed25519 => jwk::ED25519,
        }
    }

    /// Signature algorithms keys of this family can produce.
    pub fn algorithms(&self) -> &'static [Algorithm] {
        match self {
            Self::P256 => &[Algorithm::ES256],
            Self::P384 => &[Algorithm::ES384],
            Self::Secp256k1 => &[Algorithm::ES256K],
            Self::Ed25519 => &[Algorithm::EdDSA],
        }
    }

    pub fn supports(&self, algorithm: Algorithm) -> bool {
        self.algorithms().contains(&algorithm)
    }

    pub fn from_curve_name(curve: &str) -> Option<Self> {
        match curve {
            jwk::P256 => Some(Self::P256),
            jwk::P384 => Some(Self::P384),
            jwk::SECP256K1 => Some(Self::Secp256k1),
            jwk::ED25519 => Some(Self::Ed25519),
            _ => None,
        }
    }
}

impl fmt::Display for KeyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.curve_name().fmt(f)
    }
}

/// Private key able to sign presentations, tagged by family.
///
/// Produced fresh by a [`KeyResolver`](crate::KeyResolver) for every call.
#[derive(Clone)]
#[non_exhaustive]
pub enum SigningKeyMaterial {
    #[cfg(feature = "secp256r1")]
    P256(p256::SecretKey),
    #[cfg(feature = "secp384r1")]
    P384(p384::SecretKey),
    #[cfg(feature = "secp256k1")]
    Secp256k1(k256::SecretKey),
    #[cfg(feature = "ed25519")]
    Ed25519(ed25519_dalek::SigningKey),
}

impl SigningKeyMaterial {
    pub fn family(&self) -> KeyFamily {
        match *self {
            #[cfg(feature = "secp256r1")]
            Self::P256(_) => KeyFamily::P256,
            #[cfg(feature = "secp384r1")]
            Self::P384(_) => KeyFamily::P384,
            #[cfg(feature = "secp256k1")]
            Self::Secp256k1(_) => KeyFamily::Secp256k1,
            #[cfg(feature = "ed25519")]
            Self::Ed25519(_) => KeyFamily::Ed25519,
        }
    }

    /// Public half of the key, as a JWK without private parameters.
    pub fn to_public_jwk(&self) -> JWK {
        let params: Params = match *self {
            #[cfg(feature = "secp256r1")]
            Self::P256(ref k) => Params::EC(jwk::ECParams::from(&k.public_key())),
            #[cfg(feature = "secp384r1")]
            Self::P384(ref k) => Params::EC(jwk::ECParams::from(&k.public_key())),
            #[cfg(feature = "secp256k1")]
            Self::Secp256k1(ref k) => Params::EC(jwk::ECParams::from(&k.public_key())),
            #[cfg(feature = "ed25519")]
            Self::Ed25519(ref k) => Params::OKP(jwk::OctetParams::from(k).to_public()),
        };
        JWK::from(params)
    }
}

impl fmt::Debug for SigningKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeyMaterial")
            .field("family", &self.family())
            .finish_non_exhaustive()
    }
}

impl TryFrom<&JWK> for SigningKeyMaterial {
    type Error = Error;

    fn try_from(key: &JWK) -> Result<Self, Self::Error> {
        match &key.params {
            #[allow(unused)]
            Params::EC(ec) => {
                let curve = ec.curve.as_ref().ok_or(Error::MissingCurve)?;
                match KeyFamily::from_curve_name(curve) {
                    #[cfg(feature = "secp256r1")]
                    Some(KeyFamily::P256) => Ok(Self::P256(p256::SecretKey::try_from(ec)?)),
                    #[cfg(feature = "secp384r1")]
                    Some(KeyFamily::P384) => Ok(Self::P384(p384::SecretKey::try_from(ec)?)),
                    #[cfg(feature = "secp256k1")]
                    Some(KeyFamily::Secp256k1) => {
                        Ok(Self::Secp256k1(k256::SecretKey::try_from(ec)?))
                    }
                    _ => Err(Error::CurveNotImplemented(curve.to_string())),
                }
            }
            #[allow(unused)]
            Params::OKP(okp) => match KeyFamily::from_curve_name(&okp.curve) {
                #[cfg(feature = "ed25519")]
                Some(KeyFamily::Ed25519) => {
                    Ok(Self::Ed25519(ed25519_dalek::SigningKey::try_from(okp)?))
                }
                _ => Err(Error::CurveNotImplemented(okp.curve.to_string())),
            },
        }
    }
}

impl TryFrom<JWK> for SigningKeyMaterial {
    type Error = Error;

    fn try_from(key: JWK) -> Result<Self, Self::Error> {
        Self::try_from(&key)
    }
}

#[cfg(feature = "secp256r1")]
impl From<p256::SecretKey> for SigningKeyMaterial {
    fn from(key: p256::SecretKey) -> Self {
        Self::P256(key)
    }
}

#[cfg(feature = "secp384r1")]
impl From<p384::SecretKey> for SigningKeyMaterial {
    fn from(key: p384::SecretKey) -> Self {
        Self::P384(key)
    }
}

#[cfg(feature = "secp256k1")]
impl From<k256::SecretKey> for SigningKeyMaterial {
    fn from(key: k256::SecretKey) -> Self {
        Self::Secp256k1(key)
    }
}

#[cfg(feature = "ed25519")]
impl From<ed25519_dalek::SigningKey> for SigningKeyMaterial {
    fn from(key: ed25519_dalek::SigningKey) -> Self {
        Self::Ed25519(key)
    }
}
