use std::collections::HashMap;

use crate::error::Error;
use crate::jwk::Algorithm;
use crate::key::KeyFamily;

/// Registrable mapping from key family to signature algorithm.
///
/// Exactly one algorithm per family, no negotiation and no fallback. The
/// default table is:
///
/// | family      | algorithm |
/// |-------------|-----------|
/// | `P-256`     | `ES256`   |
/// | `P-384`     | `ES384`   |
/// | `secp256k1` | `ES256K`  |
/// | `Ed25519`   | `EdDSA`   |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmSelector {
    table: HashMap<KeyFamily, Algorithm>,
}

impl Default for AlgorithmSelector {
    /// The first algorithm of each family.
    fn default() -> Self {
        let table = KeyFamily::ALL
            .iter()
            .filter_map(|family| Some((*family, *family.algorithms().first()?)))
            .collect();
        Self { table }
    }
}

impl AlgorithmSelector {
    /// Selector with no registered family.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Registers `algorithm` for `family`, replacing any previous entry.
    ///
    /// Returns the replaced algorithm, or an error if keys of this family
    /// cannot produce `algorithm` signatures.
    pub fn register(
        &mut self,
        family: KeyFamily,
        algorithm: Algorithm,
    ) -> Result<Option<Algorithm>, Error> {
        if !family.supports(algorithm) {
            return Err(Error::IncompatibleAlgorithm(family, algorithm));
        }
        Ok(self.table.insert(family, algorithm))
    }

    /// Algorithm for `family`.
    ///
    /// An unregistered family is a deployment defect and reported as such.
    pub fn select(&self, family: KeyFamily) -> Result<Algorithm, Error> {
        self.table
            .get(&family)
            .copied()
            .ok_or(Error::UnregisteredKeyFamily(family))
    }

    pub fn families(&self) -> impl Iterator<Item = KeyFamily> + '_ {
        self.table.keys().copied()
    }
}
