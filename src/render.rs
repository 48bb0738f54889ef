// 🖼️ Render Model - what a presentation shell should show
//
// Pure functions: data in, view structs out. The TUI, the CLI and the web page
// all draw from these instead of keeping their own alert/result state.

use crate::catalog::{AccountRange, BinRecord};
use crate::error::LookupError;
use crate::search::Page;
use crate::validation::format_card_number;
use serde::Serialize;

const NOT_AVAILABLE: &str = "N/A";

// ============================================================================
// ALERTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Success => "success",
            AlertLevel::Info => "info",
            AlertLevel::Warning => "warning",
            AlertLevel::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
}

impl Alert {
    pub fn new(level: AlertLevel, message: impl Into<String>) -> Self {
        Alert {
            level,
            message: message.into(),
        }
    }

    pub fn welcome() -> Self {
        Alert::new(
            AlertLevel::Info,
            "Welcome to the BIN Lookup Demo! Try entering a sample BIN number.",
        )
    }

    pub fn lookup_completed() -> Self {
        Alert::new(AlertLevel::Success, "BIN lookup completed successfully!")
    }

    pub fn ranges_loaded() -> Self {
        Alert::new(AlertLevel::Success, "Account ranges loaded successfully!")
    }

    /// Outcome banner for a finished search
    pub fn search_finished(total: usize) -> Self {
        if total > 0 {
            Alert::new(AlertLevel::Success, format!("Found {} matching results!", total))
        } else {
            Alert::new(AlertLevel::Info, "No results found for your search criteria")
        }
    }

    /// Validation problems are warnings, everything else is an error banner
    pub fn from_error(err: &LookupError) -> Self {
        let level = match err {
            LookupError::BinTooShort { .. } | LookupError::NoSearchCriteria => AlertLevel::Warning,
            LookupError::BinNotFound { .. } => AlertLevel::Info,
            _ => AlertLevel::Danger,
        };
        Alert::new(level, err.to_string())
    }
}

// ============================================================================
// EMPTY STATE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyState {
    pub title: String,
    pub message: String,
}

impl EmptyState {
    fn new(title: &str, message: &str) -> Self {
        EmptyState {
            title: title.to_string(),
            message: message.to_string(),
        }
    }
}

// ============================================================================
// LOOKUP VIEW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupView {
    pub title: String,
    pub demo_mode: bool,
    pub fields: Vec<DetailField>,
    /// Pretty-printed record for the "raw data" panel
    pub raw_json: Option<String>,
    pub empty: Option<EmptyState>,
}

/// Card for a single BIN lookup. `record == None` renders the empty state.
pub fn lookup_view(bin: &str, record: Option<&BinRecord>, demo_mode: bool) -> LookupView {
    let title = format!("BIN Information for {}", format_card_number(bin));

    let Some(record) = record else {
        return LookupView {
            title,
            demo_mode,
            fields: Vec::new(),
            raw_json: None,
            empty: Some(EmptyState::new(
                "No Data Found",
                "No information available for this BIN number.",
            )),
        };
    };

    let candidates = [
        ("Issuer", record.issuer_name.clone()),
        ("Country", record.country_code.clone()),
        ("Product Type", record.product_type.to_string()),
        ("Card Type", record.card_type.clone()),
        ("Low Range", format_card_number(&record.low_account_range)),
        ("High Range", format_card_number(&record.high_account_range)),
    ];

    let fields = candidates
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(label, value)| DetailField { label, value })
        .collect();

    LookupView {
        title,
        demo_mode,
        fields,
        raw_json: serde_json::to_string_pretty(record).ok(),
        empty: None,
    }
}

// ============================================================================
// RANGE TABLE VIEW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeRow {
    pub low: String,
    pub high: String,
    pub issuer: String,
    pub country: String,
    pub product_type: String,
}

impl From<&AccountRange> for RangeRow {
    fn from(range: &AccountRange) -> Self {
        RangeRow {
            low: range_or_na(&range.low_account_range),
            high: range_or_na(&range.high_account_range),
            issuer: text_or_na(&range.issuer_name),
            country: text_or_na(&range.country_code),
            product_type: range.product_type.to_string(),
        }
    }
}

fn text_or_na(value: &str) -> String {
    if value.trim().is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        value.to_string()
    }
}

fn range_or_na(value: &str) -> String {
    if value.trim().is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        format_card_number(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangesView {
    pub rows: Vec<RangeRow>,
    /// "Showing X of Y results"
    pub summary: Option<String>,
    /// "Page n of m"
    pub page_label: Option<String>,
    pub empty: Option<EmptyState>,
}

pub fn ranges_view(page: &Page<AccountRange>) -> RangesView {
    if page.is_empty() {
        return RangesView {
            rows: Vec::new(),
            summary: None,
            page_label: None,
            empty: Some(EmptyState::new(
                "No Account Ranges Found",
                "No account range data available.",
            )),
        };
    }

    RangesView {
        rows: page.content.iter().map(RangeRow::from).collect(),
        summary: Some(format!(
            "Showing {} of {} results",
            page.number_of_elements, page.total_elements
        )),
        page_label: Some(format!("Page {} of {}", page.number + 1, page.total_pages)),
        empty: None,
    }
}

// ============================================================================
// SEARCH VIEW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchView {
    pub heading: Option<String>,
    pub cards: Vec<RangeRow>,
    pub empty: Option<EmptyState>,
}

pub fn search_view(page: &Page<AccountRange>) -> SearchView {
    if page.is_empty() {
        return SearchView {
            heading: None,
            cards: Vec::new(),
            empty: Some(EmptyState::new(
                "No Results",
                "No results found for your search criteria.",
            )),
        };
    }

    SearchView {
        heading: Some(format!("Search Results ({} found)", page.total_elements)),
        cards: page.content.iter().map(RangeRow::from).collect(),
        empty: None,
    }
}

// ============================================================================
// TESTS
// ============================================================================
