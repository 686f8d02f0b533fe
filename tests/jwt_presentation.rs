#![cfg(all(
    feature = "secp256r1",
    feature = "secp384r1",
    feature = "secp256k1",
    feature = "ed25519"
))]
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use ssi_vp_jwt::{
    jws, jwt, Algorithm, AlgorithmSelector, ClaimSet, CredentialContainer, CredentialFormat,
    Error, ErrorKind, FixedClock, InMemoryKeyResolver, JwkSet, JwtPresentationConfig,
    JwtPresentationCreator, KeyFamily, PresentationCreator, PresentationCreatorRegistry,
    PresentationParameters, SigningKeyMaterial, JWK,
};

const VP_KEY: &str = "vp-signing-key";
const ISSUER: &str = "did:web:test-issuer";
const AUDIENCE: &str = "did:web:test-audience";
const NOW: i64 = 1_700_000_000;
const VALIDITY: u64 = 300;

struct Holder {
    jwk: JWK,
    creator: JwtPresentationCreator<InMemoryKeyResolver, FixedClock>,
}

fn holder(jwk: JWK) -> Holder {
    let set = JwkSet {
        keys: vec![jwk.clone().with_key_id(VP_KEY)],
    };
    let resolver = InMemoryKeyResolver::from_jwk_set(set);
    // Sub-second part of the reading is not part of iat.
    let clock = FixedClock(Utc.timestamp_opt(NOW, 250_000_000).unwrap());
    let config = JwtPresentationConfig::new(ISSUER, VALIDITY);
    let creator = JwtPresentationCreator::with_clock(resolver, clock, config).unwrap();
    Holder { jwk, creator }
}

fn audience() -> PresentationParameters {
    PresentationParameters::with_audience(AUDIENCE)
}

fn issue_jwt_vc() -> String {
    let issuer_key = SigningKeyMaterial::try_from(JWK::generate_p256()).unwrap();
    let claims = json!({
        "iss": "did:web:vc-issuer",
        "sub": "did:web:holder",
        "vc": {
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiableCredential"],
            "credentialSubject": {"id": "did:web:holder"}
        }
    });
    jwt::encode_sign(Algorithm::ES256, &claims, &issuer_key, None).unwrap()
}

fn payload(holder: &Holder, token: &str) -> Value {
    jwt::decode_verify(token, &holder.jwk.to_public()).unwrap()
}

#[test_log::test]
fn present_jwt_vc_with_p384() {
    let holder = holder(JWK::generate_p384());
    let vc = issue_jwt_vc();
    let credentials = [CredentialContainer::new(vc.clone(), CredentialFormat::Jwt)];
    let token = holder
        .creator
        .create(&credentials, VP_KEY, Some(&audience()))
        .unwrap();
    assert_eq!(token.as_str().split('.').count(), 3);

    let (header, _) = jws::decode_unverified(token.as_str()).unwrap();
    assert_eq!(header.algorithm, Algorithm::ES384);
    assert_eq!(header.key_id.as_deref(), Some(VP_KEY));

    assert_eq!(
        payload(&holder, token.as_str()),
        json!({
            "iss": ISSUER,
            "aud": AUDIENCE,
            "iat": NOW,
            "exp": NOW + VALIDITY as i64,
            "vp": {
                "@context": ["https://www.w3.org/2018/credentials/v1"],
                "type": "VerifiablePresentation",
                "verifiableCredential": [vc]
            }
        })
    );
}

#[test_log::test]
fn present_no_credentials() {
    let holder = holder(JWK::generate_p384());
    let token = holder
        .creator
        .create(&[], VP_KEY, Some(&audience()))
        .unwrap();
    let claims: ClaimSet = jwt::decode_verify(token.as_str(), &holder.jwk.to_public()).unwrap();
    assert!(claims.verifiable_presentation.verifiable_credential.is_empty());
    assert_eq!(claims.issuer, ISSUER);
    assert_eq!(claims.audience(), Some(&json!(AUDIENCE)));
    assert_eq!(claims.issuance_date.as_seconds(), NOW as f64);
    assert_eq!(
        claims.expiration_time.as_seconds(),
        (NOW + VALIDITY as i64) as f64
    );
}

#[test_log::test]
fn unknown_key_ignores_credentials() {
    let holder = holder(JWK::generate_p384());
    for credentials in [
        vec![],
        vec![CredentialContainer::new(issue_jwt_vc(), CredentialFormat::Jwt)],
        vec![
            CredentialContainer::new("not a jwt", CredentialFormat::Jwt),
            CredentialContainer::new("{ not json", CredentialFormat::JsonLd),
        ],
    ] {
        let err = holder
            .creator
            .create(&credentials, "not-exist", Some(&audience()))
            .unwrap_err();
        assert!(matches!(&err, Error::KeyNotFound(key_id) if key_id == "not-exist"));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.is_recoverable());
    }
}

#[test_log::test]
fn absent_and_empty_parameters_differ() {
    let holder = holder(JWK::generate_p384());
    let credentials = [CredentialContainer::new(issue_jwt_vc(), CredentialFormat::Jwt)];

    let err = holder.creator.create(&credentials, VP_KEY, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapabilityUnsupported);

    let err = holder
        .creator
        .create(&credentials, VP_KEY, Some(&PresentationParameters::new()))
        .unwrap_err();
    assert!(matches!(err, Error::MissingClaim("aud")));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    // Missing audience is reported before an unknown key.
    let err = holder
        .creator
        .create(&credentials, "not-exist", Some(&PresentationParameters::new()))
        .unwrap_err();
    assert!(matches!(err, Error::MissingClaim("aud")));
}

#[test_log::test]
fn mixed_formats_embedded_verbatim() {
    let holder = holder(JWK::generate_ed25519());
    let json_ld = r#"{ "@context" : [ "https://www.w3.org/2018/credentials/v1" ],
  "type": ["VerifiableCredential"], "proof": { "type": "Ed25519Signature2018" } }"#;
    let credentials = [
        CredentialContainer::new(issue_jwt_vc(), CredentialFormat::Jwt),
        CredentialContainer::new(json_ld, CredentialFormat::JsonLd),
        CredentialContainer::new("opaque \u{e9}\u{1F511}", CredentialFormat::Jwt),
    ];
    let token = holder
        .creator
        .create(&credentials, VP_KEY, Some(&audience()))
        .unwrap();
    let claims: ClaimSet = jwt::decode_verify(token.as_str(), &holder.jwk.to_public()).unwrap();
    let embedded = claims.verifiable_presentation.verifiable_credential;
    assert_eq!(embedded.len(), credentials.len());
    for (embedded, credential) in embedded.iter().zip(&credentials) {
        assert_eq!(embedded.as_bytes(), credential.raw().as_bytes());
    }
}

#[test_log::test]
fn reserved_claims_not_overridable() {
    let holder = holder(JWK::generate_secp256k1());
    let parameters: PresentationParameters = serde_json::from_value(json!({
        "aud": [AUDIENCE, "did:web:other-audience"],
        "iss": "did:web:forged",
        "iat": 1,
        "exp": 4_102_444_800u64,
        "vp": {"verifiableCredential": ["forged"]},
        "nonce": "n-0S6_WzA2Mj"
    }))
    .unwrap();
    let token = holder
        .creator
        .create(&[], VP_KEY, Some(&parameters))
        .unwrap();
    let (header, _) = jws::decode_unverified(token.as_str()).unwrap();
    assert_eq!(header.algorithm, Algorithm::ES256K);
    assert_eq!(
        payload(&holder, token.as_str()),
        json!({
            "iss": ISSUER,
            "aud": [AUDIENCE, "did:web:other-audience"],
            "iat": NOW,
            "exp": NOW + VALIDITY as i64,
            "nonce": "n-0S6_WzA2Mj",
            "vp": {
                "@context": ["https://www.w3.org/2018/credentials/v1"],
                "type": "VerifiablePresentation",
                "verifiableCredential": []
            }
        })
    );
}

#[test_log::test]
fn unregistered_family_is_fatal() {
    let mut algorithms = AlgorithmSelector::empty();
    algorithms
        .register(KeyFamily::P256, Algorithm::ES256)
        .unwrap();
    let holder = holder(JWK::generate_p384());
    let creator = holder.creator.with_algorithms(algorithms);
    let err = creator
        .create(&[], VP_KEY, Some(&audience()))
        .unwrap_err();
    assert!(matches!(err, Error::UnregisteredKeyFamily(KeyFamily::P384)));
    assert_eq!(err.kind(), ErrorKind::FatalConfiguration);
    assert!(!err.is_recoverable());
}

#[test_log::test]
fn tampered_token_rejected() {
    let holder = holder(JWK::generate_p256());
    let token = holder
        .creator
        .create(&[], VP_KEY, Some(&audience()))
        .unwrap();
    let (header, payload, signature) = jws::split_jws(token.as_str()).unwrap();
    let forged_payload = base64::encode_config(
        serde_json::to_vec(&json!({"iss": "did:web:forged"})).unwrap(),
        base64::URL_SAFE_NO_PAD,
    );
    assert_ne!(payload, forged_payload);
    let forged = [header, forged_payload.as_str(), signature].join(".");
    assert!(matches!(
        jwt::decode_verify::<Value>(&forged, &holder.jwk.to_public()),
        Err(Error::InvalidSignature)
    ));

    let other = JWK::generate_p256().to_public();
    assert!(jwt::decode_verify::<Value>(token.as_str(), &other).is_err());
}

#[test_log::test]
fn registry_dispatches_by_format() {
    let holder = holder(JWK::generate_p384());
    let mut registry = PresentationCreatorRegistry::new();
    registry.register(holder.creator);
    let token = registry
        .create(CredentialFormat::Jwt, &[], VP_KEY, Some(&audience()))
        .unwrap();
    let claims: ClaimSet = jwt::decode_verify(token.as_str(), &holder.jwk.to_public()).unwrap();
    assert_eq!(claims.issuer, ISSUER);

    let err = registry
        .create(CredentialFormat::JsonLd, &[], VP_KEY, Some(&audience()))
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat(CredentialFormat::JsonLd)));
    assert_eq!(err.kind(), ErrorKind::FatalConfiguration);
}

#[test_log::test]
fn unsupported_stored_key_is_configuration_error() {
    let set: JwkSet = serde_json::from_value(json!({
        "keys": [
            {"kty": "oct", "kid": "hmac-key", "k": "GawgguFyGrWKav7AX4VKUg"},
            {"kty": "EC", "kid": VP_KEY, "crv": "P-521", "x": "AQ", "y": "AQ", "d": "AQ"}
        ]
    }))
    .unwrap();
    let resolver = InMemoryKeyResolver::from_jwk_set(set);
    let config = JwtPresentationConfig::new(ISSUER, VALIDITY);
    let creator = JwtPresentationCreator::new(resolver, config).unwrap();

    let err = creator
        .create(&[], VP_KEY, Some(&audience()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FatalConfiguration);
    assert!(!err.is_recoverable());

    let err = creator
        .create(&[], "hmac-key", Some(&audience()))
        .unwrap_err();
    assert!(matches!(err, Error::KeyNotFound(_)));
}
