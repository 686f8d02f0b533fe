use super::{PresentationCreator, PresentationToken};
use crate::algorithm::AlgorithmSelector;
use crate::claims::{ClaimSet, PresentationParameters, PresentationPayload};
use crate::clock::{Clock, SystemClock};
use crate::config::JwtPresentationConfig;
use crate::credential::{CredentialContainer, CredentialFormat};
use crate::error::{Error, ErrorKind};
use crate::jwt::NumericDate;
use crate::resolver::KeyResolver;

/// Creates Verifiable Presentations encoded as JWTs.
///
/// The creator holds no state besides its configuration, so a single
/// instance can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct JwtPresentationCreator<R, C = SystemClock> {
    resolver: R,
    clock: C,
    algorithms: AlgorithmSelector,
    config: JwtPresentationConfig,
}

impl<R: KeyResolver> JwtPresentationCreator<R> {
    pub fn new(resolver: R, config: JwtPresentationConfig) -> Result<Self, Error> {
        Self::with_clock(resolver, SystemClock, config)
    }
}

impl<R: KeyResolver, C: Clock> JwtPresentationCreator<R, C> {
    pub fn with_clock(resolver: R, clock: C, config: JwtPresentationConfig) -> Result<Self, Error> {
        if let Err(e) = config.validate() {
            log::error!("Rejecting JWT presentation configuration: {}", e);
            return Err(e);
        }
        Ok(Self {
            resolver,
            clock,
            algorithms: AlgorithmSelector::default(),
            config,
        })
    }

    /// Replaces the default key family to algorithm table.
    pub fn with_algorithms(mut self, algorithms: AlgorithmSelector) -> Self {
        self.algorithms = algorithms;
        self
    }

    pub fn config(&self) -> &JwtPresentationConfig {
        &self.config
    }

    pub fn algorithms(&self) -> &AlgorithmSelector {
        &self.algorithms
    }

    fn create_jwt(
        &self,
        credentials: &[CredentialContainer],
        key_id: &str,
        parameters: Option<&PresentationParameters>,
    ) -> Result<String, Error> {
        let parameters =
            parameters.ok_or(Error::CapabilityUnsupported(CredentialFormat::Jwt))?;
        parameters.require_audience()?;

        let key = self
            .resolver
            .resolve(key_id)?
            .ok_or_else(|| Error::KeyNotFound(key_id.to_string()))?;
        let family = key.family();
        let algorithm = self.algorithms.select(family)?;
        log::debug!(
            "Signing presentation of {} credential(s) with {} key '{}' ({})",
            credentials.len(),
            family,
            key_id,
            algorithm
        );

        let vp = PresentationPayload::new(self.config.contexts.clone(), credentials);
        let issuance_date = NumericDate::truncated(self.clock.now())?;
        let expiration_time = issuance_date
            .checked_add(self.config.validity())
            .ok_or(Error::TimeError)?;
        let claims = ClaimSet::assemble(
            &self.config.issuer,
            issuance_date,
            expiration_time,
            vp,
            parameters,
        );

        crate::jwt::encode_sign(algorithm, &claims, &key, Some(key_id.to_string()))
    }
}

impl<R: KeyResolver, C: Clock> PresentationCreator for JwtPresentationCreator<R, C> {
    fn format(&self) -> CredentialFormat {
        CredentialFormat::Jwt
    }

    fn create(
        &self,
        credentials: &[CredentialContainer],
        key_id: &str,
        parameters: Option<&PresentationParameters>,
    ) -> Result<PresentationToken, Error> {
        match self.create_jwt(credentials, key_id, parameters) {
            Ok(jwt) => Ok(PresentationToken(jwt)),
            Err(e) => {
                match e.kind() {
                    ErrorKind::CapabilityUnsupported | ErrorKind::InvalidArgument => {
                        log::warn!("JWT presentation request rejected: {}", e)
                    }
                    ErrorKind::FatalConfiguration => {
                        log::error!("JWT presentation creator misconfigured: {}", e)
                    }
                    ErrorKind::Internal => log::error!("Unable to sign JWT presentation: {}", e),
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::AUDIENCE;
    use crate::clock::FixedClock;
    use crate::jwk::JWK;
    use crate::resolver::InMemoryKeyResolver;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ISSUER: &str = "did:web:test-issuer";

    fn creator(key_id: &str, jwk: JWK) -> JwtPresentationCreator<InMemoryKeyResolver, FixedClock> {
        let mut resolver = InMemoryKeyResolver::new();
        resolver.insert(key_id, jwk);
        let clock = FixedClock(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        let config = JwtPresentationConfig::new(ISSUER, 60);
        JwtPresentationCreator::with_clock(resolver, clock, config).unwrap()
    }

    struct CountingResolver(AtomicUsize);

    impl KeyResolver for CountingResolver {
        fn resolve(
            &self,
            _key_id: &str,
        ) -> Result<Option<crate::key::SigningKeyMaterial>, Error> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    struct CountingClock(AtomicUsize);

    impl Clock for CountingClock {
        fn now(&self) -> chrono::DateTime<Utc> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Utc.timestamp_opt(1_700_000_000, 0).unwrap()
        }
    }

    #[test]
    fn invalid_config_rejected() {
        let err = JwtPresentationCreator::new(
            InMemoryKeyResolver::new(),
            JwtPresentationConfig::new(ISSUER, 0),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FatalConfiguration);
    }

    #[test]
    fn gates_before_key_resolution() {
        let resolver = CountingResolver(AtomicUsize::new(0));
        let creator =
            JwtPresentationCreator::new(&resolver, JwtPresentationConfig::new(ISSUER, 60)).unwrap();
        assert!(matches!(
            creator.create(&[], "key", None),
            Err(Error::CapabilityUnsupported(CredentialFormat::Jwt))
        ));
        assert!(matches!(
            creator.create(&[], "key", Some(&PresentationParameters::new())),
            Err(Error::MissingClaim(AUDIENCE))
        ));
        assert!(matches!(
            creator.create(&[], "key", Some(&PresentationParameters::with_audience(7))),
            Err(Error::InvalidClaim(AUDIENCE))
        ));
        assert_eq!(resolver.0.load(Ordering::SeqCst), 0);

        assert!(matches!(
            creator.create(&[], "key", Some(&PresentationParameters::with_audience("aud"))),
            Err(Error::KeyNotFound(_))
        ));
        assert_eq!(resolver.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[cfg(feature = "secp256r1")]
    fn clock_read_once_per_presentation() {
        let mut resolver = InMemoryKeyResolver::new();
        resolver.insert("vp-key", JWK::generate_p256());
        let clock = CountingClock(AtomicUsize::new(0));
        let creator = JwtPresentationCreator::with_clock(
            resolver,
            &clock,
            JwtPresentationConfig::new(ISSUER, 60),
        )
        .unwrap();
        let parameters = PresentationParameters::with_audience("did:web:test-audience");

        assert!(creator.create(&[], "vp-key", None).is_err());
        assert!(creator
            .create(&[], "vp-key", Some(&PresentationParameters::new()))
            .is_err());
        assert!(creator.create(&[], "not-exist", Some(&parameters)).is_err());
        assert_eq!(clock.0.load(Ordering::SeqCst), 0);

        creator.create(&[], "vp-key", Some(&parameters)).unwrap();
        assert_eq!(clock.0.load(Ordering::SeqCst), 1);
        creator.create(&[], "vp-key", Some(&parameters)).unwrap();
        assert_eq!(clock.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unusable_key_is_fatal() {
        let unsupported: JWK = serde_json::from_value(json!({
            "kty": "EC",
            "crv": "P-521",
            "x": "AQ",
            "y": "AQ",
            "d": "AQ"
        }))
        .unwrap();
        let creator = creator("vp-key", unsupported);
        let parameters = PresentationParameters::with_audience("did:web:test-audience");
        let err = creator
            .create(&[], "vp-key", Some(&parameters))
            .unwrap_err();
        assert!(matches!(&err, Error::UnusableKey(key_id, _) if key_id == "vp-key"));
        assert_eq!(err.kind(), ErrorKind::FatalConfiguration);
        assert!(!err.is_recoverable());

        let err = creator
            .create(&[], "not-exist", Some(&parameters))
            .unwrap_err();
        assert!(matches!(err, Error::KeyNotFound(_)));
    }

    #[test]
    #[cfg(feature = "secp256r1")]
    fn header_and_claims() {
        let jwk = JWK::generate_p256();
        let creator = creator("vp-key", jwk.clone());
        let parameters = PresentationParameters::with_audience("did:web:test-audience");
        let token = creator.create(&[], "vp-key", Some(&parameters)).unwrap();

        let (header, payload) =
            crate::jws::decode_verify(token.as_str(), &jwk.to_public()).unwrap();
        assert_eq!(header.algorithm, crate::jwk::Algorithm::ES256);
        assert_eq!(header.key_id.as_deref(), Some("vp-key"));
        assert_eq!(header.type_.as_deref(), Some("JWT"));
        let claims: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(
            claims,
            json!({
                "iss": ISSUER,
                "aud": "did:web:test-audience",
                "iat": 1_700_000_000,
                "exp": 1_700_000_060,
                "vp": {
                    "@context": ["https://www.w3.org/2018/credentials/v1"],
                    "type": "VerifiablePresentation",
                    "verifiableCredential": []
                }
            })
        );
    }

    #[test]
    #[cfg(feature = "ed25519")]
    fn concurrent_creation() {
        let jwk = JWK::generate_ed25519();
        let creator = creator("vp-key", jwk.clone());
        let public = jwk.to_public();
        std::thread::scope(|s| {
            for i in 0..8 {
                let creator = &creator;
                let public = &public;
                s.spawn(move || {
                    let raw = format!("credential-{}", i);
                    let credentials =
                        [CredentialContainer::new(raw.clone(), CredentialFormat::Jwt)];
                    let parameters =
                        PresentationParameters::with_audience("did:web:test-audience");
                    let token = creator
                        .create(&credentials, "vp-key", Some(&parameters))
                        .unwrap();
                    let claims: ClaimSet =
                        crate::jwt::decode_verify(token.as_str(), public).unwrap();
                    assert_eq!(claims.verifiable_presentation.verifiable_credential, [raw]);
                });
            }
        });
    }
}
