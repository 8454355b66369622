//! CLI configuration via clap.

use clap::Parser;
use std::path::PathBuf;

use crate::output::OutputFormat;
use crate::source::ReadMode;

#[derive(Parser, Debug, Clone)]
#[command(name = "slcsp")]
#[command(about = "Finds the second-lowest-cost Silver plan rate for each ZIP code in a target list")]
pub struct Config {
    /// ZIP to rate area mapping (zipcode,state,county_code,name,rate_area)
    #[arg(long, default_value = "zips.csv")]
    pub zips: PathBuf,

    /// Plan catalog (plan_id,state,metal_level,rate,rate_area)
    #[arg(long, default_value = "plans.csv")]
    pub plans: PathBuf,

    /// ZIP codes to resolve (zipcode,rate)
    #[arg(long, default_value = "slcsp.csv")]
    pub targets: PathBuf,

    /// Write results here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Prepend a `zipcode,rate` header line (csv only)
    #[arg(long)]
    pub header: bool,

    /// Fail on the first malformed row instead of ending that input there
    #[arg(long)]
    pub strict: bool,

    /// Log more to stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    pub fn read_mode(&self) -> ReadMode {
        ReadMode::from_strict(self.strict)
    }

    /// Default log filter when RUST_LOG is unset
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
