// ⚠️ Lookup Errors - everything the demo can reject
// Validation failures are advisory: shells turn them into alerts / HTTP 400

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    /// Fewer than 6 digits left after stripping non-digit characters
    #[error("Please enter a valid BIN number (6-8 digits)")]
    BinTooShort { digits: usize },

    /// Search submitted with every criterion blank
    #[error("Please enter at least one search criteria")]
    NoSearchCriteria,

    /// Unknown BIN while running in not-found mode
    #[error("No information available for BIN {bin}")]
    BinNotFound { bin: String },

    #[error("Unknown product type: {0} (expected CREDIT, DEBIT or PREPAID)")]
    InvalidProductType(String),

    #[error("Invalid value {value:?} for {key}")]
    InvalidConfig { key: String, value: String },

    #[error("Failed to load account ranges: {0}")]
    DataLoad(#[from] csv::Error),
}

impl LookupError {
    /// True for errors caused by user input (as opposed to setup problems)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LookupError::BinTooShort { .. } | LookupError::NoSearchCriteria
        )
    }
}

pub type LookupResult<T> = Result<T, LookupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_match_demo_alerts() {
        let short = LookupError::BinTooShort { digits: 4 };
        assert_eq!(short.to_string(), "Please enter a valid BIN number (6-8 digits)");
        assert!(short.is_validation());

        let empty = LookupError::NoSearchCriteria;
        assert_eq!(empty.to_string(), "Please enter at least one search criteria");
        assert!(empty.is_validation());
    }

    #[test]
    fn test_not_found_is_not_validation() {
        let err = LookupError::BinNotFound { bin: "123456".to_string() };
        assert!(!err.is_validation());
        assert!(err.to_string().contains("123456"));
    }
}
