//! Country Stats - aggregated country metrics by region
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin country_stats -- --aggregation avg --field latlng --by region
//! ```
//!
//! ## Environment Variables
//!
//! - COUNTRY_CACHE_PATH - Cache document path (default: country_data_cache.json)
//! - COUNTRY_DATA_URL - Country data endpoint (default: https://restcountries.com/v2/all)
//! - COUNTRY_SAMPLE_DATA - Read country data from this JSON file instead of the endpoint
//! - COUNTRY_FETCH_TIMEOUT_SECS - HTTP timeout in seconds (default: 15)
//! - COUNTRY_DEFAULT_TTL_SECS - Freshness when the API sends no max-age (default: 86400)
//! - RUST_LOG - Logging level (optional, default: info)

use clap::Parser;
use country_stats::{datasource, process_aggregation_request, AggregationRequest, AppConfig};
use std::process::ExitCode;

/// Retrieve aggregated stats by aggregation type, metric, and region.
#[derive(Debug, Parser)]
#[command(name = "country_stats", version)]
struct Args {
    /// Aggregation type: avg, count, max, min, sum
    #[arg(long)]
    aggregation: String,

    /// Metric to aggregate: area, borders, countries, currencies, gini, languages, latlng, population
    #[arg(long)]
    field: String,

    /// Field to group aggregates by: region, subregion
    #[arg(long)]
    by: String,
}

impl From<Args> for AggregationRequest {
    fn from(args: Args) -> Self {
        AggregationRequest {
            aggregation: Some(args.aggregation),
            field: Some(args.field),
            by: Some(args.by),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env();

    log::info!("🚀 Starting Country Stats");
    log::info!("   Cache file: {}", config.cache_path.display());
    match &config.sample_data_path {
        Some(path) => log::info!("   Data source: {}", path.display()),
        None => log::info!("   Data source: {}", config.data_url),
    }

    let request = AggregationRequest::from(args);

    let source = match datasource::source_from_config(&config) {
        Ok(source) => source,
        Err(e) => {
            log::error!("Failed to build data source: {}", e);
            eprintln!("Could not retrieve country data, please try again later.");
            return ExitCode::FAILURE;
        }
    };

    match process_aggregation_request(&request, &config, source.as_ref()).await {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            log::debug!("Request failed: {:?}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
