//! Holder-signed [Verifiable Presentations][vp] encoded as
//! [JSON Web Tokens (JWT)][jwt].
//!
//! A presentation bundles previously issued Verifiable Credentials, whatever
//! their encoding, into a single token signed by the holder. Credentials are
//! embedded in the `vp` claim exactly as received.
//!
//! [vp]: <https://www.w3.org/TR/vc-data-model/#presentations-0>
//! [jwt]: <https://www.rfc-editor.org/rfc/rfc7519>
//!
//! # Basic Usage
//!
//! ```
//! # #[cfg(feature = "secp384r1")] {
//! use ssi_vp_jwt::{
//!     CredentialContainer, CredentialFormat, InMemoryKeyResolver, JwtPresentationConfig,
//!     JwtPresentationCreator, PresentationCreator, PresentationParameters, JWK,
//! };
//!
//! let jwk = JWK::generate_p384();
//! let mut keys = InMemoryKeyResolver::new();
//! keys.insert("holder-key", jwk.clone());
//!
//! let config = JwtPresentationConfig::new("did:web:holder.example", 300);
//! let creator = JwtPresentationCreator::new(keys, config).unwrap();
//!
//! let credentials = [CredentialContainer::new(
//!     "eyJhbGciOiJFUzI1NiJ9.e30.c2ln",
//!     CredentialFormat::Jwt,
//! )];
//! let parameters = PresentationParameters::with_audience("did:web:verifier.example");
//! let token = creator
//!     .create(&credentials, "holder-key", Some(&parameters))
//!     .unwrap();
//!
//! let claims: ssi_vp_jwt::ClaimSet =
//!     ssi_vp_jwt::jwt::decode_verify(token.as_str(), &jwk.to_public()).unwrap();
//! assert_eq!(
//!     claims.verifiable_presentation.verifiable_credential,
//!     ["eyJhbGciOiJFUzI1NiJ9.e30.c2ln"]
//! );
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod algorithm;
pub mod claims;
pub mod clock;
pub mod config;
pub mod creator;
pub mod credential;
pub mod error;
pub mod jwk;
pub mod jws;
pub mod jwt;
pub mod key;
pub mod resolver;

pub use algorithm::AlgorithmSelector;
pub use claims::{ClaimSet, PresentationParameters, PresentationPayload};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::JwtPresentationConfig;
pub use creator::{
    JwtPresentationCreator, PresentationCreator, PresentationCreatorRegistry, PresentationToken,
};
pub use credential::{CredentialContainer, CredentialFormat};
pub use error::{Error, ErrorKind};
pub use jwk::{Algorithm, JwkSet, JWK};
pub use key::{KeyFamily, SigningKeyMaterial};
pub use resolver::{InMemoryKeyResolver, KeyResolver};
