// 🔎 Range Search - linear filter + pagination over the account range list

use crate::catalog::{AccountRange, BinCatalog};
use crate::error::{LookupError, LookupResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Search results always come back as a single page of this size
pub const SEARCH_PAGE_SIZE: usize = 10;

/// Listing page size when the caller asks for something out of bounds
pub const DEFAULT_PAGE_SIZE: usize = 25;

pub const MAX_PAGE_SIZE: usize = 100;

// ============================================================================
// CRITERIA
// ============================================================================

/// Normalized search criteria. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Lowercased issuer substring
    pub issuer_name: Option<String>,
    /// Uppercased country code
    pub country_code: Option<String>,
    /// Uppercased product type
    pub product_type: Option<String>,
}

impl SearchCriteria {
    /// Build from raw form values; blank values are dropped
    pub fn new(issuer_name: Option<&str>, country_code: Option<&str>, product_type: Option<&str>) -> Self {
        SearchCriteria {
            issuer_name: normalize(issuer_name).map(|s| s.to_lowercase()),
            country_code: normalize(country_code).map(|s| s.to_uppercase()),
            product_type: normalize(product_type).map(|s| s.to_uppercase()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.issuer_name.is_none() && self.country_code.is_none() && self.product_type.is_none()
    }

    /// True when every supplied criterion matches
    pub fn matches(&self, range: &AccountRange) -> bool {
        if let Some(issuer) = &self.issuer_name {
            if !range.issuer_name.to_lowercase().contains(issuer.as_str()) {
                return false;
            }
        }

        if let Some(country) = &self.country_code {
            if !range.country_code.eq_ignore_ascii_case(country) {
                return false;
            }
        }

        if let Some(product) = &self.product_type {
            if range.product_type.as_str() != product {
                return false;
            }
        }

        true
    }
}

fn normalize(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

// ============================================================================
// PAGE
// ============================================================================

/// One page of results plus totals, shaped like the card-network API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: usize,
    pub total_pages: usize,
    /// 0-based page index
    pub number: usize,
    pub number_of_elements: usize,
    pub first: bool,
    pub last: bool,
}

impl<T: Clone> Page<T> {
    /// Slice `items` into the 1-based `page` of `size` entries
    pub fn from_slice(items: &[T], page: usize, size: usize) -> Self {
        let page = page.max(1);
        let size = size.max(1);
        let total = items.len();

        let start = (page - 1).saturating_mul(size).min(total);
        let end = start.saturating_add(size).min(total);
        let content = items[start..end].to_vec();

        Page {
            number_of_elements: content.len(),
            content,
            total_elements: total,
            total_pages: total.div_ceil(size),
            number: page - 1,
            first: page == 1,
            last: (page - 1).saturating_mul(size).saturating_add(size) >= total,
        }
    }
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// More matches exist than fit on this page
    pub fn is_truncated(&self) -> bool {
        self.total_elements > self.number_of_elements
    }
}

// ============================================================================
// LISTING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSort {
    /// Catalog order
    Source,
    LowAscending,
    LowDescending,
}

impl RangeSort {
    /// Parse the API's `sort` parameter (`lowAccountRange` / `-lowAccountRange`).
    /// Anything else keeps catalog order.
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            Some("lowAccountRange") | Some("+lowAccountRange") => RangeSort::LowAscending,
            Some("-lowAccountRange") => RangeSort::LowDescending,
            _ => RangeSort::Source,
        }
    }
}

/// Numeric comparison of two digit strings of possibly different width
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Clamp raw paging parameters the way the demo API does
pub fn clamp_paging(page: Option<i64>, size: Option<i64>) -> (usize, usize) {
    let page = match page {
        Some(p) if p >= 1 => p as usize,
        _ => 1,
    };
    let size = match size {
        Some(s) if (1..=MAX_PAGE_SIZE as i64).contains(&s) => s as usize,
        _ => DEFAULT_PAGE_SIZE,
    };
    (page, size)
}

/// Page through every account range
pub fn list_ranges(catalog: &BinCatalog, page: usize, size: usize, sort: RangeSort) -> Page<AccountRange> {
    let mut ranges = catalog.ranges().to_vec();

    match sort {
        RangeSort::Source => {}
        RangeSort::LowAscending => {
            ranges.sort_by(|a, b| compare_numeric(&a.low_account_range, &b.low_account_range))
        }
        RangeSort::LowDescending => {
            ranges.sort_by(|a, b| compare_numeric(&b.low_account_range, &a.low_account_range))
        }
    }

    Page::from_slice(&ranges, page, size)
}

// ============================================================================
// SEARCH
// ============================================================================

/// Filter the range list; first page of at most `SEARCH_PAGE_SIZE` results.
///
/// Source order is preserved. Rejects criteria with nothing set.
pub fn search_ranges(catalog: &BinCatalog, criteria: &SearchCriteria) -> LookupResult<Page<AccountRange>> {
    search_ranges_page(catalog, criteria, 1)
}

/// Same filter, any 1-based page. The page size stays `SEARCH_PAGE_SIZE`.
pub fn search_ranges_page(
    catalog: &BinCatalog,
    criteria: &SearchCriteria,
    page: usize,
) -> LookupResult<Page<AccountRange>> {
    if criteria.is_empty() {
        return Err(LookupError::NoSearchCriteria);
    }

    let matches: Vec<AccountRange> = catalog
        .ranges()
        .iter()
        .filter(|range| criteria.matches(range))
        .cloned()
        .collect();

    tracing::debug!(?criteria, page, matches = matches.len(), "range search");

    Ok(Page::from_slice(&matches, page, SEARCH_PAGE_SIZE))
}

// ============================================================================
// TESTS
// ============================================================================
