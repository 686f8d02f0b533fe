use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Context of the W3C Verifiable Credentials Data Model v1.1.
pub const DEFAULT_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

fn default_contexts() -> Vec<String> {
    vec![DEFAULT_CONTEXT.to_string()]
}

/// Deployment configuration of a [`JwtPresentationCreator`](crate::JwtPresentationCreator).
///
/// There is no default validity window: it must be chosen by the deployment.
///
/// ```
/// use ssi_vp_jwt::JwtPresentationConfig;
///
/// let config = JwtPresentationConfig::from_json_str(
///     r#"{"issuer": "did:web:holder.example", "validitySeconds": 300}"#,
/// )
/// .unwrap();
/// assert_eq!(config.validity().num_seconds(), 300);
/// assert_eq!(config.contexts, ["https://www.w3.org/2018/credentials/v1"]);
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JwtPresentationConfig {
    /// Value of the `iss` claim of every presentation.
    pub issuer: String,
    /// Distance between `iat` and `exp`, in seconds.
    pub validity_seconds: u64,
    /// `@context` of the `vp` claim.
    #[serde(default = "default_contexts")]
    pub contexts: Vec<String>,
}

impl JwtPresentationConfig {
    pub fn new(issuer: impl Into<String>, validity_seconds: u64) -> Self {
        Self {
            issuer: issuer.into(),
            validity_seconds,
            contexts: default_contexts(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_contexts(mut self, contexts: Vec<String>) -> Self {
        self.contexts = contexts;
        self
    }

    /// Validity window as a duration.
    ///
    /// Saturates on windows [`validate`](Self::validate) rejects.
    pub fn validity(&self) -> Duration {
        i64::try_from(self.validity_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.issuer.trim().is_empty() {
            return Err(Error::InvalidConfiguration("issuer is empty".to_string()));
        }
        if self.validity_seconds == 0 {
            return Err(Error::InvalidConfiguration(
                "validity window is zero".to_string(),
            ));
        }
        if i64::try_from(self.validity_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .is_none()
        {
            return Err(Error::InvalidConfiguration(format!(
                "validity window of {} seconds is out of range",
                self.validity_seconds
            )));
        }
        if self.contexts.is_empty() {
            return Err(Error::InvalidConfiguration(
                "no presentation context".to_string(),
            ));
        }
        Ok(())
    }
}
