use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use rate_core::{BoundaryPolicy, RatePoint};
use rust_decimal::Decimal;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Effective-rate tax calculator.
///
/// Interpolates an effective tax rate for an income from a sparse schedule
/// of (threshold, rate) points and reports the resulting tax.
#[derive(Debug, Parser)]
#[command(name = "effective-tax", version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    /// `RUST_LOG` takes precedence when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also append log output to this file.
    #[arg(long, value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute the effective rate and tax owed for one income.
    Compute {
        /// Income to tax. Commas are accepted as thousands separators.
        #[arg(long, value_parser = parse_amount, allow_negative_numbers = true)]
        income: Decimal,

        #[command(flatten)]
        schedule: ScheduleArgs,
    },

    /// Compute taxes for every income in a CSV file (columns: income, id).
    Batch {
        /// CSV file of incomes.
        #[arg(long, value_name = "FILE")]
        incomes: PathBuf,

        /// Write results here instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        schedule: ScheduleArgs,
    },

    /// Print the resolved schedule, implicit floor included.
    Show {
        #[command(flatten)]
        schedule: ScheduleArgs,
    },
}

/// Where the rate schedule comes from.
#[derive(Debug, Clone, Args)]
pub struct ScheduleArgs {
    /// Inline schedule point; repeat for each threshold.
    #[arg(long = "rate", value_name = "THRESHOLD=RATE", value_parser = parse_rate_point)]
    pub rates: Vec<RatePoint<Decimal>>,

    /// Schedule file: `.toml` configuration or CSV (schedule,threshold,rate).
    #[arg(long, value_name = "FILE", conflicts_with = "rates")]
    pub schedule_file: Option<PathBuf>,

    /// Schedule to use from the file.
    #[arg(long, value_name = "NAME", requires = "schedule_file")]
    pub schedule: Option<String>,

    /// How to treat incomes on or below a threshold: `compatible` or `exact`.
    /// Defaults to the file's `boundary_policy`, then `compatible`.
    #[arg(long, value_name = "POLICY")]
    pub boundary: Option<BoundaryPolicy>,
}

// ─── value parsers ───────────────────────────────────────────────────────────

/// Parses a decimal amount, ignoring surrounding whitespace and comma
/// thousands separators (e.g. `"1,234.56"`).
pub fn parse_amount(s: &str) -> Result<Decimal, String> {
    let normalized = s.trim().replace(',', "");
    normalized
        .parse()
        .map_err(|e| format!("invalid amount '{s}': {e}"))
}

/// Parses a `THRESHOLD=RATE` pair such as `50,000=0.12`.
pub fn parse_rate_point(s: &str) -> Result<RatePoint<Decimal>, String> {
    let (threshold, rate) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid rate point '{s}': expected THRESHOLD=RATE"))?;

    Ok(RatePoint::new(parse_amount(threshold)?, parse_amount(rate)?))
}
