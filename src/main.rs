// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io;
use std::path::PathBuf;

// Use library instead of local modules
use bin_lookup_demo::{
    init_tracing, list_ranges, lookup_view, ranges_view, search_ranges, search_view,
    Alert, BinCatalog, DemoConfig, LookupError, LookupView, RangeRow,
    RangeSort, RangesView, Resolver, SearchCriteria, SearchView, UnknownBinPolicy,
};

#[derive(Parser, Debug)]
#[command(
    name = "bin-lookup",
    version,
    about = "BIN lookup demo backed by built-in mock data",
    long_about = "Resolve card BINs and search account ranges against a built-in mock catalog.\n\nExamples:\n  bin-lookup lookup 545454\n  bin-lookup search --country us --product credit\n  bin-lookup ranges --page 1 --size 5 --format csv\n\nWith no subcommand the interactive terminal UI starts."
)]
struct Cli {
    /// Replace the built-in account ranges with a CSV file
    #[arg(long, value_name = "FILE", global = true)]
    ranges_csv: Option<PathBuf>,

    /// What to do with BINs missing from the catalog
    #[arg(long, value_enum, global = true)]
    unknown: Option<UnknownArg>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up a BIN (first 6 digits of the input are used)
    Lookup {
        bin: String,
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// List account ranges page by page
    Ranges {
        #[arg(long, default_value_t = 1)]
        page: i64,
        #[arg(long, default_value_t = 25)]
        size: i64,
        /// lowAccountRange or -lowAccountRange
        #[arg(long)]
        sort: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// Search account ranges (at least one criterion)
    Search {
        /// Issuer name substring, case-insensitive
        #[arg(long)]
        issuer: Option<String>,
        /// Two-letter country code
        #[arg(long)]
        country: Option<String>,
        /// CREDIT, DEBIT or PREPAID
        #[arg(long)]
        product: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// Print the sample BINs known to the catalog
    Samples,
    /// Interactive terminal UI
    Ui,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
    Csv,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum UnknownArg {
    Synthesize,
    NotFound,
}

impl From<UnknownArg> for UnknownBinPolicy {
    fn from(arg: UnknownArg) -> Self {
        match arg {
            UnknownArg::Synthesize => UnknownBinPolicy::Synthesize,
            UnknownArg::NotFound => UnknownBinPolicy::NotFound,
        }
    }
}

fn main() -> Result<()> {
    init_tracing("warn");

    let cli = Cli::parse();

    let mut config = DemoConfig::from_env().context("Invalid environment configuration")?;
    if let Some(path) = cli.ranges_csv {
        config.ranges_csv = Some(path);
    }
    if let Some(unknown) = cli.unknown {
        config.unknown_bins = unknown.into();
    }

    let catalog = config.load_catalog().context("Failed to load BIN catalog")?;

    match cli.command.unwrap_or(Command::Ui) {
        Command::Lookup { bin, format } => run_lookup(&catalog, &config, &bin, format),
        Command::Ranges { page, size, sort, format } => {
            run_ranges(&catalog, page, size, sort.as_deref(), format)
        }
        Command::Search { issuer, country, product, format } => {
            let criteria = SearchCriteria::new(issuer.as_deref(), country.as_deref(), product.as_deref());
            run_search(&catalog, &criteria, format)
        }
        Command::Samples => {
            run_samples(&catalog);
            Ok(())
        }
        Command::Ui => run_ui_mode(catalog, config),
    }
}

fn run_lookup(catalog: &BinCatalog, config: &DemoConfig, bin: &str, format: Format) -> Result<()> {
    let resolver = Resolver::new(catalog, config.unknown_bins);

    match resolver.lookup(bin) {
        Ok(resolution) => {
            match format {
                Format::Json => {
                    println!("{}", serde_json::to_string_pretty(&resolution.record)?);
                }
                Format::Csv => write_csv(io::stdout(), std::slice::from_ref(&resolution.record))?,
                Format::Table => {
                    print_lookup(&lookup_view(&resolution.bin, Some(&resolution.record), true));
                    print_alert(&Alert::lookup_completed());
                }
            }
            Ok(())
        }
        Err(LookupError::BinNotFound { bin }) => {
            print_lookup(&lookup_view(&bin, None, true));
            Ok(())
        }
        Err(err) if err.is_validation() => {
            print_alert(&Alert::from_error(&err));
            std::process::exit(2);
        }
        Err(err) => Err(err.into()),
    }
}

fn run_ranges(catalog: &BinCatalog, page: i64, size: i64, sort: Option<&str>, format: Format) -> Result<()> {
    let (page, size) = bin_lookup_demo::clamp_paging(Some(page), Some(size));
    let result = list_ranges(catalog, page, size, RangeSort::from_param(sort));

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        Format::Csv => write_csv(io::stdout(), &result.content)?,
        Format::Table => {
            print_ranges(&ranges_view(&result));
            print_alert(&Alert::ranges_loaded());
        }
    }
    Ok(())
}

fn run_search(catalog: &BinCatalog, criteria: &SearchCriteria, format: Format) -> Result<()> {
    let result = match search_ranges(catalog, criteria) {
        Ok(result) => result,
        Err(err) if err.is_validation() => {
            print_alert(&Alert::from_error(&err));
            std::process::exit(2);
        }
        Err(err) => return Err(err.into()),
    };

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        Format::Csv => write_csv(io::stdout(), &result.content)?,
        Format::Table => {
            print_search(&search_view(&result));
            print_alert(&Alert::search_finished(result.total_elements));
        }
    }
    Ok(())
}

fn run_samples(catalog: &BinCatalog) {
    println!("🔍 Available sample BINs:");
    for bin in catalog.sample_bins() {
        if let Some(record) = catalog.get(bin) {
            println!("   {} - {} ({})", bin, record.issuer_name, record.country_code);
        }
    }
}

// ============================================================================
// Output
// ============================================================================

/// One header row, then one row per record
fn write_csv<W: io::Write, T: Serialize>(out: W, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn print_alert(alert: &Alert) {
    eprintln!("[{}] {}", alert.level.as_str(), alert.message);
}

fn print_lookup(view: &LookupView) {
    println!("💳 {}", view.title);
    if view.demo_mode {
        println!("   (demo data)");
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if let Some(empty) = &view.empty {
        println!("⚠️  {}", empty.title);
        println!("   {}", empty.message);
        return;
    }

    for field in &view.fields {
        println!("{:<14} {}", field.label, field.value);
    }
}

fn print_rows(rows: &[RangeRow]) {
    println!(
        "{:<22} {:<22} {:<20} {:<8} {}",
        "Low Range", "High Range", "Issuer", "Country", "Type"
    );
    for row in rows {
        println!(
            "{:<22} {:<22} {:<20} {:<8} {}",
            row.low, row.high, row.issuer, row.country, row.product_type
        );
    }
}

fn print_ranges(view: &RangesView) {
    if let Some(empty) = &view.empty {
        println!("📭 {}", empty.title);
        println!("   {}", empty.message);
        return;
    }

    print_rows(&view.rows);
    println!();
    if let (Some(summary), Some(page_label)) = (&view.summary, &view.page_label) {
        println!("{}  |  {}", summary, page_label);
    }
}

fn print_search(view: &SearchView) {
    if let Some(empty) = &view.empty {
        println!("🔎 {}", empty.message);
        return;
    }

    if let Some(heading) = &view.heading {
        println!("🔎 {}", heading);
    }
    print_rows(&view.cards);
}

// ============================================================================
// Terminal UI
// ============================================================================

#[cfg(feature = "tui")]
fn run_ui_mode(catalog: BinCatalog, config: DemoConfig) -> Result<()> {
    let mut app = ui::App::new(catalog, config.unknown_bins);
    ui::run_ui(&mut app)?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_catalog: BinCatalog, _config: DemoConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the web demo: cargo run --bin bin-lookup-server --features server");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_text<T: Serialize>(rows: &[T]) -> String {
        let mut out = Vec::new();
        write_csv(&mut out, rows).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_lookup_record_as_csv() {
        let catalog = BinCatalog::new();
        let record = catalog.get("545454").unwrap();

        let text = csv_text(std::slice::from_ref(record));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("issuerName,countryCode,productType,cardType"));
        assert!(lines[1].starts_with("Chase Bank,US,CREDIT,MASTERCARD,5454540000000000,5454549999999999"));
    }

    #[test]
    fn test_ranges_as_csv() {
        let catalog = BinCatalog::new();
        let page = list_ranges(&catalog, 1, 3, RangeSort::Source);

        let text = csv_text(&page.content);
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().nth(1).unwrap().contains("Chase Bank"));
    }
}
