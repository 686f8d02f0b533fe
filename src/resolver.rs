use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Error;
use crate::jwk::{JwkSet, JWK};
use crate::key::SigningKeyMaterial;

/// Signing key resolver.
///
/// Any type that can fetch signing key material from its identifier. Called
/// once per presentation, with no caching expected from the caller.
///
/// `Ok(None)` means no key is known under this ID. A known key that cannot
/// sign is an error.
pub trait KeyResolver: Send + Sync {
    fn resolve(&self, key_id: &str) -> Result<Option<SigningKeyMaterial>, Error>;
}

impl<'a, T: KeyResolver + ?Sized> KeyResolver for &'a T {
    fn resolve(&self, key_id: &str) -> Result<Option<SigningKeyMaterial>, Error> {
        T::resolve(*self, key_id)
    }
}

impl<T: KeyResolver + ?Sized> KeyResolver for Arc<T> {
    fn resolve(&self, key_id: &str) -> Result<Option<SigningKeyMaterial>, Error> {
        T::resolve(self, key_id)
    }
}

impl<T: KeyResolver + ?Sized> KeyResolver for Box<T> {
    fn resolve(&self, key_id: &str) -> Result<Option<SigningKeyMaterial>, Error> {
        T::resolve(self, key_id)
    }
}

/// Private JWKs indexed by key ID.
#[derive(Debug, Default, Clone)]
pub struct InMemoryKeyResolver {
    keys: HashMap<String, JWK>,
}

impl InMemoryKeyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key_id: impl Into<String>, key: JWK) -> Option<JWK> {
        self.keys.insert(key_id.into(), key)
    }

    /// Indexes every key of `set` by its `kid`. Keys without one are skipped.
    pub fn from_jwk_set(set: JwkSet) -> Self {
        let mut resolver = Self::new();
        for key in set.keys {
            match key.key_id.clone() {
                Some(key_id) => {
                    resolver.insert(key_id, key);
                }
                None => log::warn!("Skipping JWK without key ID"),
            }
        }
        resolver
    }

    pub fn contains(&self, key_id: &str) -> bool {
        self.keys.contains_key(key_id)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeyResolver for InMemoryKeyResolver {
    fn resolve(&self, key_id: &str) -> Result<Option<SigningKeyMaterial>, Error> {
        let jwk = match self.keys.get(key_id) {
            Some(jwk) => jwk,
            None => return Ok(None),
        };
        match SigningKeyMaterial::try_from(jwk) {
            Ok(key) => Ok(Some(key)),
            Err(e) => {
                log::warn!("Key '{}' is not usable for signing: {}", key_id, e);
                Err(Error::UnusableKey(key_id.to_string(), Box::new(e)))
            }
        }
    }
}
