//! Batch evaluation of incomes against a rate schedule.
//!
//! ## Input CSV
//!
//! | Column   | Required | Type    | Notes                                  |
//! |----------|----------|---------|----------------------------------------|
//! | `income` | yes      | decimal | e.g. `52000.00`                        |
//! | `id`     | no       | string  | Defaults to the 1-based row number     |
//!
//! ## Output CSV
//!
//! `id,income,effective_rate,tax_owed`, one row per input row, in input
//! order.

use std::io::{Read, Write};

use rate_core::{BoundaryPolicy, EffectiveRateInterpolator, RateSchedule};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ScheduleLoaderError;

/// One row of an incomes CSV file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IncomeRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub income: Decimal,
}

/// One row of the results CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxResultRecord {
    pub id: String,
    pub income: Decimal,
    pub effective_rate: Decimal,
    pub tax_owed: Decimal,
}

/// Parse income records from a CSV reader. Rows are returned in file order.
pub fn parse_incomes<R: Read>(reader: R) -> Result<Vec<IncomeRecord>, ScheduleLoaderError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .deserialize::<IncomeRecord>()
        .map(|result| result.map_err(ScheduleLoaderError::from))
        .collect()
}

/// Compute the effective rate and tax owed for every record.
///
/// Records without an `id` are labelled with their 1-based row number.
/// Amounts are normalized so that trailing zeros introduced by the
/// arithmetic do not leak into the output.
pub fn evaluate_incomes(
    records: &[IncomeRecord],
    schedule: &RateSchedule<Decimal>,
    policy: BoundaryPolicy,
) -> Result<Vec<TaxResultRecord>, ScheduleLoaderError> {
    let interpolator = EffectiveRateInterpolator::new(schedule).with_policy(policy);

    let results = records
        .iter()
        .enumerate()
        .map(|(idx, record)| -> Result<TaxResultRecord, ScheduleLoaderError> {
            let tax = interpolator.calculate(record.income)?;
            Ok(TaxResultRecord {
                id: record.id.clone().unwrap_or_else(|| (idx + 1).to_string()),
                income: record.income,
                effective_rate: tax.effective_rate.normalize(),
                tax_owed: tax.tax_owed.normalize(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(rows = results.len(), policy = %interpolator.policy(), "evaluated income batch");
    Ok(results)
}

/// Write result records as CSV, header included.
pub fn write_results<W: Write>(
    writer: W,
    results: &[TaxResultRecord],
) -> Result<(), ScheduleLoaderError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for result in results {
        csv_writer
            .serialize(result)
            .map_err(|e| ScheduleLoaderError::CsvWrite(e.to_string()))?;
    }

    csv_writer
        .flush()
        .map_err(|e| ScheduleLoaderError::CsvWrite(e.to_string()))
}
