use crate::credential::CredentialFormat;
use crate::jwk::Algorithm;
use crate::key::KeyFamily;

/// Error type for `ssi-vp-jwt`.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The creator cannot produce a presentation without caller parameters.
    #[error("Presentation creation without additional parameters is not supported for format {0}")]
    CapabilityUnsupported(CredentialFormat),
    /// A mandatory pass-through claim is absent from the parameters.
    #[error("Must provide additional data: '{0}'")]
    MissingClaim(&'static str),
    /// A pass-through claim is present but unusable.
    #[error("Invalid value for claim '{0}'")]
    InvalidClaim(&'static str),
    #[error("No key could be found with key ID '{0}'")]
    KeyNotFound(String),
    /// A key is stored under this ID but cannot sign.
    #[error("Key '{0}' cannot be used for signing: {1}")]
    UnusableKey(String, #[source] Box<Error>),
    #[error("No signature algorithm registered for key family {0}")]
    UnregisteredKeyFamily(KeyFamily),
    #[error("Algorithm {1} cannot be produced by key family {0}")]
    IncompatibleAlgorithm(KeyFamily, Algorithm),
    #[error("No presentation creator registered for format {0}")]
    UnsupportedFormat(CredentialFormat),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Missing curve in JWK
    #[error("Missing curve in JWK")]
    MissingCurve,
    /// Curve not implemented
    #[error("Curve not implemented: '{0}'")]
    CurveNotImplemented(String),
    #[error("Missing private key parameter in JWK")]
    MissingPrivateKey,
    #[error("Missing elliptic curve point in JWK")]
    MissingPoint,
    #[error("Key material rejected")]
    KeyRejected,
    #[error("Key type not implemented")]
    KeyTypeNotImplemented,
    /// Algorithm in JWS header does not match JWK
    #[error("Algorithm in JWS header does not match JWK")]
    AlgorithmMismatch,
    #[error("Unsupported algorithm")]
    UnsupportedAlgorithm,
    #[error("Invalid JWS")]
    InvalidJWS,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Unable to convert date/time")]
    TimeError,
    #[error(transparent)]
    Crypto(#[from] signature::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),
}

/// Coarse classification of [`Error`], in the order the presentation
/// gates are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The operation shape is not supported (e.g. no parameters at all).
    CapabilityUnsupported,
    /// Bad caller input: missing claim, malformed claim, unknown key.
    InvalidArgument,
    /// Deployment defect that no caller input can fix.
    FatalConfiguration,
    /// Key material, encoding or signing failure.
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CapabilityUnsupported(_) => ErrorKind::CapabilityUnsupported,
            Self::MissingClaim(_) | Self::InvalidClaim(_) | Self::KeyNotFound(_) => {
                ErrorKind::InvalidArgument
            }
            Self::UnregisteredKeyFamily(_)
            | Self::UnusableKey(..)
            | Self::IncompatibleAlgorithm(..)
            | Self::UnsupportedFormat(_)
            | Self::InvalidConfiguration(_) => ErrorKind::FatalConfiguration,
            _ => ErrorKind::Internal,
        }
    }

    /// Whether the caller can succeed by changing its request.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::CapabilityUnsupported | ErrorKind::InvalidArgument
        )
    }
}
