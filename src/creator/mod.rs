//! Presentation creation, one creator per credential format.
use core::fmt;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::claims::PresentationParameters;
use crate::credential::{CredentialContainer, CredentialFormat};
use crate::error::Error;

mod jwt;
pub use jwt::JwtPresentationCreator;

/// Capability of bundling credentials into a holder-signed presentation.
pub trait PresentationCreator: Send + Sync {
    /// Encoding of the presentations this creator produces.
    fn format(&self) -> CredentialFormat;

    /// Creates a presentation of `credentials` signed with the key `key_id`.
    ///
    /// `parameters` are caller-supplied claims. `None` and an empty set of
    /// parameters are distinct requests.
    fn create(
        &self,
        credentials: &[CredentialContainer],
        key_id: &str,
        parameters: Option<&PresentationParameters>,
    ) -> Result<PresentationToken, Error>;
}

impl<T: PresentationCreator + ?Sized> PresentationCreator for Box<T> {
    fn format(&self) -> CredentialFormat {
        T::format(self)
    }

    fn create(
        &self,
        credentials: &[CredentialContainer],
        key_id: &str,
        parameters: Option<&PresentationParameters>,
    ) -> Result<PresentationToken, Error> {
        T::create(self, credentials, key_id, parameters)
    }
}

/// Signed presentation, in its transport encoding.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PresentationToken(String);

impl PresentationToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for PresentationToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<PresentationToken> for String {
    fn from(token: PresentationToken) -> Self {
        token.0
    }
}

impl fmt::Display for PresentationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Presentation creators indexed by format.
#[derive(Default)]
pub struct PresentationCreatorRegistry {
    creators: HashMap<CredentialFormat, Box<dyn PresentationCreator>>,
}

impl PresentationCreatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `creator` under its own format, returning the creator it
    /// replaces.
    pub fn register(
        &mut self,
        creator: impl PresentationCreator + 'static,
    ) -> Option<Box<dyn PresentationCreator>> {
        self.creators.insert(creator.format(), Box::new(creator))
    }

    pub fn creator(&self, format: CredentialFormat) -> Result<&dyn PresentationCreator, Error> {
        match self.creators.get(&format) {
            Some(creator) => Ok(creator.as_ref()),
            None => {
                log::error!("No presentation creator for format {}", format);
                Err(Error::UnsupportedFormat(format))
            }
        }
    }

    pub fn formats(&self) -> impl Iterator<Item = CredentialFormat> + '_ {
        self.creators.keys().copied()
    }

    pub fn create(
        &self,
        format: CredentialFormat,
        credentials: &[CredentialContainer],
        key_id: &str,
        parameters: Option<&PresentationParameters>,
    ) -> Result<PresentationToken, Error> {
        self.creator(format)?
            .create(credentials, key_id, parameters)
    }
}

impl fmt::Debug for PresentationCreatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresentationCreatorRegistry")
            .field("formats", &self.creators.keys().collect::<Vec<_>>())
            .finish()
    }
}
