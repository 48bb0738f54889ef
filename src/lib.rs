// BIN Lookup Demo - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod catalog;
pub mod config;
pub mod error;
pub mod render;     // View models consumed by the CLI, TUI and web page
pub mod resolver;
pub mod search;
pub mod validation;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use catalog::{AccountRange, BinCatalog, BinRecord, ProductType};
pub use config::{DemoConfig, LatencyRange, SimulatedLatency};
pub use error::{LookupError, LookupResult};
pub use render::{
    Alert, AlertLevel, DetailField, EmptyState, LookupView, RangeRow, RangesView, SearchView,
    lookup_view, ranges_view, search_view,
};
pub use resolver::{RecordSource, Resolution, Resolver, UnknownBinPolicy, synthesize_record};
pub use search::{
    Page, RangeSort, SearchCriteria,
    clamp_paging, list_ranges, search_ranges, search_ranges_page,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, SEARCH_PAGE_SIZE,
};
pub use validation::{clean_bin, format_card_number, is_valid_bin, prepare_lookup_key};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the tracing subscriber shared by both binaries.
///
/// `RUST_LOG` wins; otherwise `default_level` applies.
pub fn init_tracing(default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr so JSON/CSV output on stdout stays clean.
    // try_init: a subscriber may already be installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
