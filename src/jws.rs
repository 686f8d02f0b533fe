use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::jwk::{Algorithm, Params as JWKParams, JWK};
use crate::key::{KeyFamily, SigningKeyMaterial};

// RFC 7515 - JSON Web Signature (JWS)

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Header {
    #[serde(rename = "alg")]
    pub algorithm: Algorithm,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "kid")]
    pub key_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "typ")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "cty")]
    pub content_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "crit")]
    pub critical: Option<Vec<String>>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    #[serde(flatten)]
    pub additional_parameters: BTreeMap<String, serde_json::Value>,
}

fn base64_encode_json<T: Serialize>(object: &T) -> Result<String, Error> {
    let json = serde_json::to_string(&object)?;
    Ok(base64::encode_config(json, base64::URL_SAFE_NO_PAD))
}

pub fn sign_bytes(
    algorithm: Algorithm,
    data: &[u8],
    key: &SigningKeyMaterial,
) -> Result<Vec<u8>, Error> {
    let signature: Vec<u8> = match (algorithm, key) {
        #[cfg(feature = "secp256r1")]
        (Algorithm::ES256, SigningKeyMaterial::P256(secret_key)) => {
            use p256::ecdsa::signature::Signer;
            let signing_key = p256::ecdsa::SigningKey::from(secret_key);
            let sig: p256::ecdsa::Signature = signing_key.try_sign(data)?;
            sig.to_bytes().to_vec()
        }
        #[cfg(feature = "secp384r1")]
        (Algorithm::ES384, SigningKeyMaterial::P384(secret_key)) => {
            use p384::ecdsa::signature::Signer;
            let signing_key = p384::ecdsa::SigningKey::from(secret_key);
            let sig: p384::ecdsa::Signature = signing_key.try_sign(data)?; // Uses SHA-384 by default.
            sig.to_bytes().to_vec()
        }
        #[cfg(feature = "secp256k1")]
        (Algorithm::ES256K, SigningKeyMaterial::Secp256k1(secret_key)) => {
            use k256::ecdsa::signature::Signer;
            let signing_key = k256::ecdsa::SigningKey::from(secret_key);
            let sig: k256::ecdsa::Signature = signing_key.try_sign(data)?;
            sig.to_bytes().to_vec()
        }
        #[cfg(feature = "ed25519")]
        (Algorithm::EdDSA, SigningKeyMaterial::Ed25519(signing_key)) => {
            use ed25519_dalek::Signer;
            signing_key.try_sign(data)?.to_bytes().to_vec()
        }
        #[allow(unreachable_patterns)]
        _ => return Err(Error::UnsupportedAlgorithm),
    };
    Ok(signature)
}

pub fn sign_bytes_b64(
    algorithm: Algorithm,
    data: &[u8],
    key: &SigningKeyMaterial,
) -> Result<String, Error> {
    let signature = sign_bytes(algorithm, data, key)?;
    let sig_b64 = base64::encode_config(signature, base64::URL_SAFE_NO_PAD);
    Ok(sig_b64)
}

#[allow(unused_variables)]
pub fn verify_bytes(
    algorithm: Algorithm,
    data: &[u8],
    key: &JWK,
    signature: &[u8],
) -> Result<(), Error> {
    if let Some(key_algorithm) = key.algorithm {
        if key_algorithm != algorithm {
            return Err(Error::AlgorithmMismatch);
        }
    }
    match &key.params {
        #[allow(unused)]
        JWKParams::EC(ec) => {
            let curve = ec.curve.as_ref().ok_or(Error::MissingCurve)?;
            match (algorithm, KeyFamily::from_curve_name(curve)) {
                #[cfg(feature = "secp256r1")]
                (Algorithm::ES256, Some(KeyFamily::P256)) => {
                    use p256::ecdsa::signature::Verifier;
                    let public_key = p256::PublicKey::try_from(ec)?;
                    let verifying_key = p256::ecdsa::VerifyingKey::from(&public_key);
                    let sig = p256::ecdsa::Signature::from_slice(signature)?;
                    verifying_key
                        .verify(data, &sig)
                        .map_err(|_| Error::InvalidSignature)
                }
                #[cfg(feature = "secp384r1")]
                (Algorithm::ES384, Some(KeyFamily::P384)) => {
                    use p384::ecdsa::signature::Verifier;
                    let public_key = p384::PublicKey::try_from(ec)?;
                    let verifying_key = p384::ecdsa::VerifyingKey::from(&public_key);
                    let sig = p384::ecdsa::Signature::from_slice(signature)?;
                    verifying_key
                        .verify(data, &sig)
                        .map_err(|_| Error::InvalidSignature)
                }
                #[cfg(feature = "secp256k1")]
                (Algorithm::ES256K, Some(KeyFamily::Secp256k1)) => {
                    use k256::ecdsa::signature::Verifier;
                    let public_key = k256::PublicKey::try_from(ec)?;
                    let verifying_key = k256::ecdsa::VerifyingKey::from(&public_key);
                    let sig = k256::ecdsa::Signature::from_slice(signature)?;
                    verifying_key
                        .verify(data, &sig)
                        .map_err(|_| Error::InvalidSignature)
                }
                (_, None) => Err(Error::CurveNotImplemented(curve.to_string())),
                _ => Err(Error::AlgorithmMismatch),
            }
        }
        #[allow(unused)]
        JWKParams::OKP(okp) => match algorithm {
            #[cfg(feature = "ed25519")]
            Algorithm::EdDSA => {
                use ed25519_dalek::Verifier;
                let verifying_key = ed25519_dalek::VerifyingKey::try_from(okp)?;
                let sig = ed25519_dalek::Signature::from_slice(signature)?;
                verifying_key
                    .verify(data, &sig)
                    .map_err(|_| Error::InvalidSignature)
            }
            _ => Err(Error::AlgorithmMismatch),
        },
    }
}

pub fn encode_sign_custom_header(
    payload: &str,
    key: &SigningKeyMaterial,
    header: &Header,
) -> Result<String, Error> {
    let header_b64 = base64_encode_json(header)?;
    let payload_b64 = base64::encode_config(payload, base64::URL_SAFE_NO_PAD);
    let signing_input = header_b64 + "." + &payload_b64;
    let sig_b64 = sign_bytes_b64(header.algorithm, signing_input.as_bytes(), key)?;
    let jws = [signing_input, sig_b64].join(".");
    Ok(jws)
}

pub fn encode_sign(
    algorithm: Algorithm,
    payload: &str,
    key: &SigningKeyMaterial,
) -> Result<String, Error> {
    let header = Header {
        algorithm,
        ..Default::default()
    };
    encode_sign_custom_header(payload, key, &header)
}

pub fn split_jws(jws: &str) -> Result<(&str, &str, &str), Error> {
    let mut parts = jws.split('.');
    Ok(
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), Some(c), None) => (a, b, c),
            _ => return Err(Error::InvalidJWS),
        },
    )
}

pub struct DecodedJWS {
    pub header: Header,
    pub signing_input: Vec<u8>,
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

/// Decode JWS parts (JOSE header, payload, and signature) into useful values.
/// "crit" (critical) header parameters are rejected, since no extension is
/// understood here.
pub fn decode_jws_parts(
    header_b64: &str,
    payload_b64: &str,
    signature_b64: &str,
) -> Result<DecodedJWS, Error> {
    let signature = base64::decode_config(signature_b64, base64::URL_SAFE_NO_PAD)?;
    let header_json = base64::decode_config(header_b64, base64::URL_SAFE_NO_PAD)?;
    let header: Header = serde_json::from_slice(&header_json)?;
    let payload = base64::decode_config(payload_b64, base64::URL_SAFE_NO_PAD)?;
    if header.critical.is_some() {
        return Err(Error::InvalidJWS);
    }
    let signing_input = [header_b64.as_bytes(), b".", payload_b64.as_bytes()].concat();
    Ok(DecodedJWS {
        header,
        signing_input,
        payload,
        signature,
    })
}

pub fn decode_verify(jws: &str, key: &JWK) -> Result<(Header, Vec<u8>), Error> {
    let (header_b64, payload_b64, signature_b64) = split_jws(jws)?;
    let DecodedJWS {
        header,
        signing_input,
        payload,
        signature,
    } = decode_jws_parts(header_b64, payload_b64, signature_b64)?;
    verify_bytes(header.algorithm, &signing_input, key, &signature)?;
    Ok((header, payload))
}

pub fn decode_unverified(jws: &str) -> Result<(Header, Vec<u8>), Error> {
    let (header_b64, payload_b64, signature_b64) = split_jws(jws)?;
    let DecodedJWS {
        header,
        signing_input: _,
        payload,
        signature: _,
    } = decode_jws_parts(header_b64, payload_b64, signature_b64)?;
    Ok((header, payload))
}
