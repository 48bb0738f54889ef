// 🔍 BIN Resolver - 6-digit key → BinRecord
//
// Known keys come straight from the catalog. Unknown keys either get a
// placeholder record (demo behaviour) or are reported as not found.

use crate::catalog::{BinCatalog, BinRecord, ProductType};
use crate::error::{LookupError, LookupResult};
use crate::validation::{prepare_lookup_key, BIN_KEY_LEN};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Placeholder country codes for unknown BINs
pub const DEMO_COUNTRIES: [&str; 7] = ["US", "GB", "CA", "DE", "FR", "JP", "AU"];

/// Placeholder card networks for unknown BINs
pub const DEMO_CARD_TYPES: [&str; 3] = ["MASTERCARD", "VISA", "AMERICAN EXPRESS"];

/// Width of a synthesized account range
pub const ACCOUNT_NUMBER_LEN: usize = 16;

// ============================================================================
// UNKNOWN BIN POLICY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownBinPolicy {
    /// Fabricate a placeholder record
    #[default]
    Synthesize,
    /// Report the BIN as not found
    NotFound,
}

impl FromStr for UnknownBinPolicy {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "synthesize" | "synth" => Ok(UnknownBinPolicy::Synthesize),
            "not-found" | "notfound" | "none" => Ok(UnknownBinPolicy::NotFound),
            _ => Err(LookupError::InvalidConfig {
                key: "unknown BIN policy".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// Where a resolved record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    Catalog,
    Synthesized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The 6-digit key actually looked up
    pub bin: String,
    pub record: BinRecord,
    pub source: RecordSource,
}

pub struct Resolver<'a> {
    catalog: &'a BinCatalog,
    policy: UnknownBinPolicy,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a BinCatalog, policy: UnknownBinPolicy) -> Self {
        Resolver { catalog, policy }
    }

    pub fn policy(&self) -> UnknownBinPolicy {
        self.policy
    }

    /// Validate raw input and resolve it with the thread-local RNG
    pub fn lookup(&self, input: &str) -> LookupResult<Resolution> {
        self.lookup_with(input, &mut rand::thread_rng())
    }

    /// Validate raw input and resolve it with a caller-supplied RNG
    pub fn lookup_with<R: Rng + ?Sized>(&self, input: &str, rng: &mut R) -> LookupResult<Resolution> {
        let key = prepare_lookup_key(input)?;
        self.resolve_with(&key, rng)
    }

    /// Resolve an already-validated digit string (first 6 digits are the key)
    pub fn resolve_with<R: Rng + ?Sized>(&self, digits: &str, rng: &mut R) -> LookupResult<Resolution> {
        if digits.len() < BIN_KEY_LEN || !digits.is_char_boundary(BIN_KEY_LEN) {
            return Err(LookupError::BinTooShort { digits: digits.len() });
        }
        let key = &digits[..BIN_KEY_LEN];

        if let Some(record) = self.catalog.get(key) {
            tracing::debug!(bin = key, issuer = %record.issuer_name, "known BIN");
            return Ok(Resolution {
                bin: key.to_string(),
                record: record.clone(),
                source: RecordSource::Catalog,
            });
        }

        match self.policy {
            UnknownBinPolicy::Synthesize => {
                tracing::debug!(bin = key, "unknown BIN, synthesizing placeholder");
                Ok(Resolution {
                    bin: key.to_string(),
                    record: synthesize_record(key, rng),
                    source: RecordSource::Synthesized,
                })
            }
            UnknownBinPolicy::NotFound => {
                tracing::debug!(bin = key, "unknown BIN");
                Err(LookupError::BinNotFound { bin: key.to_string() })
            }
        }
    }
}

/// Placeholder record for a key missing from the catalog.
///
/// Shape is fixed, values for country / product / network are random.
pub fn synthesize_record<R: Rng + ?Sized>(key: &str, rng: &mut R) -> BinRecord {
    let prefix: String = key.chars().take(3).collect();

    BinRecord {
        issuer_name: format!("Demo Bank {}", prefix),
        country_code: pick(&DEMO_COUNTRIES, rng).to_string(),
        product_type: *ProductType::ALL.choose(rng).unwrap_or(&ProductType::Credit),
        card_type: pick(&DEMO_CARD_TYPES, rng).to_string(),
        low_account_range: pad_range(key, '0'),
        high_account_range: pad_range(key, '9'),
        issuer_country: "Demo Country".to_string(),
        product_sub_type: "STANDARD".to_string(),
    }
}

fn pick<R: Rng + ?Sized>(options: &[&'static str], rng: &mut R) -> &'static str {
    options.choose(rng).copied().unwrap_or_default()
}

fn pad_range(key: &str, fill: char) -> String {
    let mut range = key.to_string();
    while range.len() < ACCOUNT_NUMBER_LEN {
        range.push(fill);
    }
    range
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn resolver() -> Resolver<'static> {
        Resolver::new(BinCatalog::builtin(), UnknownBinPolicy::Synthesize)
    }

    #[test]
    fn test_known_bins_return_stored_record() {
        let catalog = BinCatalog::builtin();
        let resolver = resolver();
        let mut rng = StdRng::seed_from_u64(7);

        for bin in catalog.sample_bins() {
            let resolution = resolver.resolve_with(bin, &mut rng).unwrap();
            assert_eq!(&resolution.record, catalog.get(bin).unwrap());
            assert_eq!(resolution.source, RecordSource::Catalog);
            assert_eq!(&resolution.bin, bin);
        }
    }

    #[test]
    fn test_only_first_six_digits_are_used() {
        let resolver = resolver();
        let mut rng = StdRng::seed_from_u64(7);

        let resolution = resolver.resolve_with("5454541234567890", &mut rng).unwrap();
        assert_eq!(resolution.bin, "545454");
        assert_eq!(resolution.record.issuer_name, "Chase Bank");
    }

    #[test]
    fn test_unknown_bins_get_padded_ranges() {
        let resolver = resolver();

        for (seed, key) in ["123456", "000000", "999999", "601100", "222100"].iter().enumerate() {
            let mut rng = StdRng::seed_from_u64(seed as u64);
            let resolution = resolver.resolve_with(key, &mut rng).unwrap();
            let record = &resolution.record;

            assert_eq!(resolution.source, RecordSource::Synthesized);
            assert_eq!(record.low_account_range.len(), 16);
            assert_eq!(record.high_account_range.len(), 16);
            assert!(record.low_account_range.starts_with(key));
            assert!(record.high_account_range.starts_with(key));
            assert!(record.low_account_range[6..].chars().all(|c| c == '0'));
            assert!(record.high_account_range[6..].chars().all(|c| c == '9'));
        }
    }

    #[test]
    fn test_synthesized_record_shape() {
        let mut rng = StdRng::seed_from_u64(42);
        let record = synthesize_record("123456", &mut rng);

        assert_eq!(record.issuer_name, "Demo Bank 123");
        assert!(DEMO_COUNTRIES.contains(&record.country_code.as_str()));
        assert!(DEMO_CARD_TYPES.contains(&record.card_type.as_str()));
        assert!(ProductType::ALL.contains(&record.product_type));
        assert_eq!(record.issuer_country, "Demo Country");
        assert_eq!(record.product_sub_type, "STANDARD");
    }

    #[test]
    fn test_same_seed_same_placeholder() {
        let a = synthesize_record("777777", &mut StdRng::seed_from_u64(3));
        let b = synthesize_record("777777", &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_lookup_rejects_short_input() {
        let resolver = resolver();
        let result = resolver.lookup("4242-4");
        assert!(matches!(result, Err(LookupError::BinTooShort { digits: 5 })));
    }

    #[test]
    fn test_lookup_strips_formatting() {
        let resolver = resolver();
        let resolution = resolver.lookup("4242 4242 4242 4242").unwrap();
        assert_eq!(resolution.bin, "424242");
        assert_eq!(resolution.record.issuer_name, "HSBC Bank");
    }

    #[test]
    fn test_not_found_policy() {
        let resolver = Resolver::new(BinCatalog::builtin(), UnknownBinPolicy::NotFound);

        assert!(resolver.lookup("545454").is_ok());
        match resolver.lookup("123456") {
            Err(LookupError::BinNotFound { bin }) => assert_eq!(bin, "123456"),
            other => panic!("expected BinNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("synthesize".parse::<UnknownBinPolicy>().unwrap(), UnknownBinPolicy::Synthesize);
        assert_eq!("Not-Found".parse::<UnknownBinPolicy>().unwrap(), UnknownBinPolicy::NotFound);
        assert!("maybe".parse::<UnknownBinPolicy>().is_err());
    }
}
