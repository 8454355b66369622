// SLCSP Resolver - Core Library
// Exposes all modules for use in the CLI and tests

pub mod config;
pub mod index;
pub mod loader;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod resolver;
pub mod source;

// Re-export commonly used types
pub use config::Config;
pub use index::{PlanIndex, RateAreaIndex};
pub use loader::{
    load_plans, load_targets, load_zips,
    parse_silver_plan, parse_zip_link,
    TargetList,
};
pub use model::{MetalLevel, Plan, Rate, RateArea, ZipCode, ZipRateLink};
pub use output::{write_report, OutputFormat};
pub use pipeline::{resolve_inputs, run, Inputs};
pub use resolver::{second_lowest_rate, Report, Resolution, ResolvedRow, Resolver, Status};
pub use source::{drain, CsvSource, Parsed, ReadMode, SourceRow, SourceStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
