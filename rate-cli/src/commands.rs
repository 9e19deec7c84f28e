//! Command implementations. Every command writes its results to the given
//! writer; diagnostics go through `tracing`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use rate_core::{BoundaryPolicy, EffectiveRateInterpolator, RateSchedule, RateSource};
use rate_data::{evaluate_incomes, load_schedule_file, parse_incomes, write_results};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::cli::{Cli, Command, ScheduleArgs};

/// Runs the parsed command, writing results to `out`.
pub fn run<W: Write>(
    cli: &Cli,
    out: &mut W,
) -> Result<()> {
    match &cli.command {
        Command::Compute { income, schedule } => compute(*income, schedule, out),
        Command::Batch {
            incomes,
            output,
            schedule,
        } => batch(incomes, output.as_deref(), schedule, out),
        Command::Show { schedule } => show(schedule, out),
    }
}

/// Resolves the schedule and boundary policy requested on the command line.
pub fn resolve_schedule(args: &ScheduleArgs) -> Result<(RateSchedule<Decimal>, BoundaryPolicy)> {
    if !args.rates.is_empty() {
        let mut schedule = RateSchedule::new();
        for point in &args.rates {
            if let Some(previous) = schedule.insert(point.threshold, point.rate) {
                warn!(
                    threshold = %point.threshold,
                    %previous,
                    rate = %point.rate,
                    "threshold given more than once; keeping the last rate"
                );
            }
        }
        return Ok((schedule, args.boundary.unwrap_or_default()));
    }

    let Some(path) = &args.schedule_file else {
        bail!("No rate schedule given; use --rate THRESHOLD=RATE or --schedule-file FILE");
    };

    let set = load_schedule_file(path)
        .with_context(|| format!("Failed to load schedule file: {}", path.display()))?;
    let schedule = set
        .select(args.schedule.as_deref())
        .with_context(|| format!("Failed to select schedule from: {}", path.display()))?
        .clone();
    let policy = args
        .boundary
        .or(set.boundary_policy())
        .unwrap_or_default();

    debug!(path = %path.display(), points = schedule.len(), %policy, "loaded schedule");
    Ok((schedule, policy))
}

fn compute<W: Write>(
    income: Decimal,
    args: &ScheduleArgs,
    out: &mut W,
) -> Result<()> {
    let (schedule, policy) = resolve_schedule(args)?;

    let interpolator = EffectiveRateInterpolator::new(&schedule).with_policy(policy);
    debug!(%income, policy = %interpolator.policy(), "computing tax");

    let tax = interpolator
        .calculate(income)
        .with_context(|| format!("Failed to compute tax for income {income}"))?;

    writeln!(out, "effective_rate={}", tax.effective_rate.normalize())?;
    writeln!(out, "tax_owed={}", tax.tax_owed.normalize())?;
    writeln!(out, "source={}", describe_source(&tax.source))?;
    Ok(())
}

fn batch<W: Write>(
    incomes: &Path,
    output: Option<&Path>,
    args: &ScheduleArgs,
    out: &mut W,
) -> Result<()> {
    let (schedule, policy) = resolve_schedule(args)?;

    let file = File::open(incomes)
        .with_context(|| format!("Failed to open: {}", incomes.display()))?;
    let records = parse_incomes(file)
        .with_context(|| format!("Failed to parse CSV: {}", incomes.display()))?;
    let results = evaluate_incomes(&records, &schedule, policy)
        .with_context(|| format!("Failed to evaluate incomes from: {}", incomes.display()))?;

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create: {}", path.display()))?;
            write_results(BufWriter::new(file), &results)
                .with_context(|| format!("Failed to write results to: {}", path.display()))?;
            info!(rows = results.len(), path = %path.display(), "wrote results");
        }
        None => write_results(out, &results).context("Failed to write results")?,
    }

    Ok(())
}

fn show<W: Write>(
    args: &ScheduleArgs,
    out: &mut W,
) -> Result<()> {
    let (schedule, policy) = resolve_schedule(args)?;

    writeln!(out, "boundary_policy={policy}")?;
    for point in schedule.with_floor().points() {
        writeln!(
            out,
            "threshold={} rate={}",
            point.threshold.normalize(),
            point.rate.normalize()
        )?;
    }
    Ok(())
}

/// Human-readable description of how a rate was resolved.
pub fn describe_source(source: &RateSource<Decimal>) -> String {
    match source {
        RateSource::Interpolated { lower, upper } => format!(
            "interpolated between {} and {}",
            lower.normalize(),
            upper.normalize()
        ),
        RateSource::TopThreshold(threshold) => format!("top threshold {}", threshold.normalize()),
        RateSource::ExactThreshold(threshold) => format!("threshold {}", threshold.normalize()),
    }
}
