// 🗂️ BIN Catalog - the static mock data behind every lookup
//
// Two read-only tables, built once per process:
// - BIN table: 6-digit prefix → BinRecord
// - Account ranges: ordered list used by listing and search
//
// Nothing here is ever mutated after construction.

use crate::error::{LookupError, LookupResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

// ============================================================================
// PRODUCT TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductType {
    Credit,
    Debit,
    Prepaid,
}

impl ProductType {
    pub const ALL: [ProductType; 3] = [ProductType::Credit, ProductType::Debit, ProductType::Prepaid];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Credit => "CREDIT",
            ProductType::Debit => "DEBIT",
            ProductType::Prepaid => "PREPAID",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CREDIT" => Ok(ProductType::Credit),
            "DEBIT" => Ok(ProductType::Debit),
            "PREPAID" => Ok(ProductType::Prepaid),
            _ => Err(LookupError::InvalidProductType(s.to_string())),
        }
    }
}

// ============================================================================
// RECORDS
// ============================================================================

/// Full BIN lookup result, shaped like the card-network response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinRecord {
    pub issuer_name: String,
    pub country_code: String,
    pub product_type: ProductType,
    pub card_type: String,
    pub low_account_range: String,
    pub high_account_range: String,
    pub issuer_country: String,
    pub product_sub_type: String,
}

/// One contiguous block of card numbers attributed to an issuer/product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRange {
    pub low_account_range: String,
    pub high_account_range: String,
    pub issuer_name: String,
    pub country_code: String,
    pub product_type: ProductType,
}

impl AccountRange {
    fn new(low: &str, high: &str, issuer: &str, country: &str, product_type: ProductType) -> Self {
        AccountRange {
            low_account_range: low.to_string(),
            high_account_range: high.to_string(),
            issuer_name: issuer.to_string(),
            country_code: country.to_string(),
            product_type,
        }
    }

    /// Check whether a card number (or prefix) falls inside this range.
    ///
    /// Both sides are compared as digit strings padded to the range width.
    pub fn contains(&self, number: &str) -> bool {
        let width = self.low_account_range.len();
        let mut padded: String = number.chars().take(width).collect();
        while padded.len() < width {
            padded.push('0');
        }
        padded.as_str() >= self.low_account_range.as_str()
            && padded.as_str() <= self.high_account_range.as_str()
    }
}

// ============================================================================
// CATALOG
// ============================================================================

pub struct BinCatalog {
    records: HashMap<String, BinRecord>,
    /// Keys in declaration order (HashMap has none)
    sample_bins: Vec<String>,
    ranges: Vec<AccountRange>,
}

impl BinCatalog {
    /// The built-in demo catalog, shared for the life of the process
    pub fn builtin() -> &'static BinCatalog {
        static CATALOG: OnceLock<BinCatalog> = OnceLock::new();
        CATALOG.get_or_init(BinCatalog::new)
    }

    /// Build a fresh copy of the demo data
    pub fn new() -> Self {
        let mut catalog = BinCatalog {
            records: HashMap::new(),
            sample_bins: Vec::new(),
            ranges: Vec::new(),
        };

        catalog.register_default_bins();
        catalog.ranges = default_ranges();
        catalog
    }

    /// Same BIN table, account ranges replaced by the rows of a CSV file.
    ///
    /// The file needs a header row with the camelCase field names.
    pub fn with_ranges_csv(path: &Path) -> LookupResult<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut ranges = Vec::new();
        for row in reader.deserialize() {
            let range: AccountRange = row?;
            ranges.push(range);
        }

        tracing::info!(path = %path.display(), count = ranges.len(), "loaded account ranges from CSV");

        let mut catalog = BinCatalog::new();
        catalog.ranges = ranges;
        Ok(catalog)
    }

    fn register_default_bins(&mut self) {
        self.register("545454", "Chase Bank", "US", ProductType::Credit, "MASTERCARD",
            "5454540000000000", "5454549999999999", "United States", "STANDARD");
        self.register("515555", "Citibank", "US", ProductType::Credit, "MASTERCARD",
            "5155550000000000", "5155559999999999", "United States", "WORLD");
        self.register("555555", "Bank of America", "US", ProductType::Credit, "MASTERCARD",
            "5555550000000000", "5555559999999999", "United States", "PLATINUM");
        self.register("424242", "HSBC Bank", "GB", ProductType::Debit, "VISA",
            "4242420000000000", "4242429999999999", "United Kingdom", "CLASSIC");
        self.register("411111", "Wells Fargo", "US", ProductType::Credit, "VISA",
            "4111110000000000", "4111119999999999", "United States", "SIGNATURE");
        // Amex numbers are 15 digits
        self.register("378282", "American Express", "US", ProductType::Credit, "AMERICAN EXPRESS",
            "378282000000000", "378282999999999", "United States", "GOLD");
    }

    #[allow(clippy::too_many_arguments)]
    fn register(
        &mut self,
        bin: &str,
        issuer: &str,
        country: &str,
        product_type: ProductType,
        card_type: &str,
        low: &str,
        high: &str,
        issuer_country: &str,
        sub_type: &str,
    ) {
        let record = BinRecord {
            issuer_name: issuer.to_string(),
            country_code: country.to_string(),
            product_type,
            card_type: card_type.to_string(),
            low_account_range: low.to_string(),
            high_account_range: high.to_string(),
            issuer_country: issuer_country.to_string(),
            product_sub_type: sub_type.to_string(),
        };

        if self.records.insert(bin.to_string(), record).is_none() {
            self.sample_bins.push(bin.to_string());
        }
    }

    /// Exact lookup by 6-digit key
    pub fn get(&self, bin: &str) -> Option<&BinRecord> {
        self.records.get(bin)
    }

    /// Known BINs in declaration order
    pub fn sample_bins(&self) -> &[String] {
        &self.sample_bins
    }

    pub fn ranges(&self) -> &[AccountRange] {
        &self.ranges
    }

    /// Every range containing the given card number
    pub fn ranges_containing<'a>(&'a self, number: &'a str) -> impl Iterator<Item = &'a AccountRange> + 'a {
        self.ranges.iter().filter(move |r| r.contains(number))
    }
}

impl Default for BinCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn default_ranges() -> Vec<AccountRange> {
    use ProductType::*;

    vec![
        AccountRange::new("5454540000000000", "5454549999999999", "Chase Bank", "US", Credit),
        AccountRange::new("5155550000000000", "5155559999999999", "Citibank", "US", Credit),
        AccountRange::new("5555550000000000", "5555559999999999", "Bank of America", "US", Credit),
        AccountRange::new("4242420000000000", "4242429999999999", "HSBC Bank", "GB", Debit),
        AccountRange::new("4111110000000000", "4111119999999999", "Wells Fargo", "US", Credit),
        AccountRange::new("378282000000000", "378282999999999", "American Express", "US", Credit),
        AccountRange::new("6011000000000000", "6011999999999999", "Discover Bank", "US", Credit),
        AccountRange::new("5432100000000000", "5432109999999999", "Capital One", "US", Credit),
    ]
}

// ============================================================================
// TEST FIXTURES
// ============================================================================


// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_catalog_contents() {
        let catalog = BinCatalog::builtin();

        assert_eq!(
            catalog.sample_bins(),
            &["545454", "515555", "555555", "424242", "411111", "378282"]
        );
        assert_eq!(catalog.ranges().len(), 8);
        assert_eq!(catalog.ranges()[0].issuer_name, "Chase Bank");
        assert_eq!(catalog.ranges()[7].issuer_name, "Capital One");
    }

    #[test]
    fn test_get_known_bin() {
        let catalog = BinCatalog::new();

        let hsbc = catalog.get("424242").unwrap();
        assert_eq!(hsbc.issuer_name, "HSBC Bank");
        assert_eq!(hsbc.country_code, "GB");
        assert_eq!(hsbc.product_type, ProductType::Debit);
        assert_eq!(hsbc.issuer_country, "United Kingdom");

        assert!(catalog.get("999999").is_none());
    }

    #[test]
    fn test_product_type_parsing() {
        assert_eq!("credit".parse::<ProductType>().unwrap(), ProductType::Credit);
        assert_eq!(" Debit ".parse::<ProductType>().unwrap(), ProductType::Debit);
        assert_eq!("PREPAID".parse::<ProductType>().unwrap(), ProductType::Prepaid);
        assert!("charge".parse::<ProductType>().is_err());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let catalog = BinCatalog::new();
        let json = serde_json::to_value(catalog.get("545454").unwrap()).unwrap();

        assert_eq!(json["issuerName"], "Chase Bank");
        assert_eq!(json["productType"], "CREDIT");
        assert_eq!(json["cardType"], "MASTERCARD");
        assert_eq!(json["lowAccountRange"], "5454540000000000");
        assert_eq!(json["productSubType"], "STANDARD");
        assert_eq!(json.as_object().unwrap().len(), 8);
    }

    #[test]
    fn test_range_contains() {
        let catalog = BinCatalog::new();
        let discover = &catalog.ranges()[6];

        assert!(discover.contains("6011000000000000"));
        assert!(discover.contains("6011123412341234"));
        assert!(discover.contains("601155"));
        assert!(!discover.contains("6012000000000000"));

        let hits: Vec<_> = catalog.ranges_containing("378282123456789").collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].issuer_name, "American Express");
    }

    #[test]
    fn test_ranges_from_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "lowAccountRange,highAccountRange,issuerName,countryCode,productType").unwrap();
        writeln!(file, "2221000000000000,2221009999999999,Monzo,GB,DEBIT").unwrap();
        writeln!(file, "4000000000000000,4000009999999999,Test Prepaid,CA,PREPAID").unwrap();
        file.flush().unwrap();

        let catalog = BinCatalog::with_ranges_csv(file.path()).unwrap();

        assert_eq!(catalog.ranges().len(), 2);
        assert_eq!(catalog.ranges()[0].issuer_name, "Monzo");
        assert_eq!(catalog.ranges()[1].product_type, ProductType::Prepaid);
        // BIN table is untouched
        assert!(catalog.get("545454").is_some());
    }

    #[test]
    fn test_ranges_from_bad_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "lowAccountRange,highAccountRange,issuerName,countryCode,productType").unwrap();
        writeln!(file, "2221000000000000,2221009999999999,Monzo,GB,CHARGE").unwrap();
        file.flush().unwrap();

        let result = BinCatalog::with_ranges_csv(file.path());
        assert!(matches!(result, Err(LookupError::DataLoad(_))));
    }
}
