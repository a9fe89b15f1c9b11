//! Canonical record adapter.
//!
//! Each provider gets a [`StatementAdapter`] that knows its field names and
//! how it represents the year of a record. [`normalize`] drives the adapter
//! chosen by the caller's [`Provider`] tag and merges the three statement
//! categories into one year-descending [`YearRecord`] series.

mod frame;
mod rest;

pub use frame::TickerFrameAdapter;
pub use rest::RestStatementAdapter;

use crate::error::{Result, StatementError};
use crate::schema::{DividendEvent, LineItem, Provider, YearRecord};
use log::{debug, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementCategory {
    Income,
    Balance,
    CashFlow,
}

impl StatementCategory {
    pub const ALL: [StatementCategory; 3] = [
        StatementCategory::Income,
        StatementCategory::Balance,
        StatementCategory::CashFlow,
    ];

    /// Line items this statement is allowed to populate.
    pub fn line_items(&self) -> &'static [LineItem] {
        match self {
            StatementCategory::Income => &[
                LineItem::Revenue,
                LineItem::GrossProfit,
                LineItem::Ebitda,
                LineItem::NetIncome,
            ],
            StatementCategory::Balance => &[
                LineItem::TotalDebt,
                LineItem::CashAndEquivalents,
                LineItem::TotalAssets,
                LineItem::TotalEquity,
                LineItem::TotalCurrentAssets,
                LineItem::TotalCurrentLiabilities,
            ],
            StatementCategory::CashFlow => {
                &[LineItem::OperatingCashFlow, LineItem::CapitalExpenditure]
            }
        }
    }
}

impl fmt::Display for StatementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementCategory::Income => write!(f, "income statement"),
            StatementCategory::Balance => write!(f, "balance sheet"),
            StatementCategory::CashFlow => write!(f, "cash flow statement"),
        }
    }
}

/// One provider record before year resolution and merging.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialRecord {
    /// Index of the record within the provider's raw statement list.
    pub position: usize,
    /// Year carried by the record itself, if any.
    pub year: Option<i32>,
    pub values: Vec<(LineItem, Option<f64>)>,
}

impl PartialRecord {
    fn into_year_record(self, year: i32) -> YearRecord {
        let mut record = YearRecord::new(year);
        for (item, value) in self.values {
            *record.slot_mut(item) = value;
        }
        record
    }
}

/// A record that could not be read. Its year is kept when the year itself
/// parsed, so positional alignment of other categories still works.
#[derive(Debug)]
pub struct SkippedRecord {
    pub position: usize,
    pub year: Option<i32>,
    pub error: StatementError,
}

pub type RecordOutcome = std::result::Result<PartialRecord, SkippedRecord>;

fn position_and_year(outcome: &RecordOutcome) -> (usize, Option<i32>) {
    match outcome {
        Ok(record) => (record.position, record.year),
        Err(skipped) => (skipped.position, skipped.year),
    }
}

pub trait StatementAdapter {
    fn provider(&self) -> Provider;

    /// Splits one raw statement payload into records. Records that cannot be
    /// read come back as `Err` so the caller can skip them and carry on.
    fn parse_statement(&self, category: StatementCategory, raw: &Value) -> Vec<RecordOutcome>;

    fn parse_dividends(&self, raw: &Value) -> Vec<Result<DividendEvent>>;
}

pub fn adapter_for(provider: Provider) -> &'static dyn StatementAdapter {
    match provider {
        Provider::RestStatements => &RestStatementAdapter,
        Provider::TickerLibrary => &TickerFrameAdapter,
    }
}

/// Maps a provider's raw income, balance and cash flow payloads onto a
/// year-descending series of canonical records.
///
/// Missing or empty categories are tolerated. Records that fail to parse are
/// skipped with a warning, and years with no line item at all are dropped.
/// If nothing usable remains in any category the result is
/// [`StatementError::NoData`].
pub fn normalize(
    provider: Provider,
    raw_income: &Value,
    raw_balance: &Value,
    raw_cashflow: &Value,
) -> Result<Vec<YearRecord>> {
    let adapter = adapter_for(provider);

    let parsed: Vec<(StatementCategory, Vec<RecordOutcome>)> = StatementCategory::ALL
        .iter()
        .zip([raw_income, raw_balance, raw_cashflow])
        .map(|(category, raw)| {
            let outcomes = adapter.parse_statement(*category, raw);
            debug!("{} {} records read from {}", outcomes.len(), category, provider);
            (*category, outcomes)
        })
        .collect();

    // Records without a year of their own line up positionally with the first
    // category that does carry years.
    let anchor_years: Vec<Option<i32>> = parsed
        .iter()
        .find(|(_, outcomes)| outcomes.iter().any(|o| position_and_year(o).1.is_some()))
        .map(|(_, outcomes)| {
            let len = outcomes
                .iter()
                .map(|o| position_and_year(o).0 + 1)
                .max()
                .unwrap_or(0);
            let mut years = vec![None; len];
            for outcome in outcomes {
                let (position, year) = position_and_year(outcome);
                years[position] = year;
            }
            years
        })
        .unwrap_or_default();

    let mut by_year: BTreeMap<i32, YearRecord> = BTreeMap::new();

    for (category, outcomes) in parsed {
        for outcome in outcomes {
            let record = match outcome {
                Ok(record) => record,
                Err(skipped) => {
                    warn!(
                        "Skipping {} record #{} from {}: {}",
                        category, skipped.position, provider, skipped.error
                    );
                    continue;
                }
            };

            let year = record
                .year
                .or_else(|| anchor_years.get(record.position).copied().flatten());

            let Some(year) = year else {
                warn!(
                    "Skipping {} record #{} from {}: no year could be resolved",
                    category, record.position, provider
                );
                continue;
            };

            let incoming = record.into_year_record(year);
            by_year
                .entry(year)
                .or_insert_with(|| YearRecord::new(year))
                .absorb(&incoming);
        }
    }

    let before = by_year.len();
    by_year.retain(|_, record| !record.is_empty());
    if by_year.len() != before {
        debug!(
            "Dropped {} year(s) from {} with no line items",
            before - by_year.len(),
            provider
        );
    }

    if by_year.is_empty() {
        return Err(StatementError::NoData { provider });
    }

    Ok(by_year.into_values().rev().collect())
}

/// Reads the first present, non-null amount among `keys` from a JSON object.
pub(crate) fn lookup_amount(
    object: &serde_json::Map<String, Value>,
    keys: &[&str],
) -> Result<Option<f64>> {
    for key in keys {
        if let Some(value) = object.get(*key) {
            if let Some(amount) = crate::utils::parse_amount(value)? {
                return Ok(Some(amount));
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_categories_signal_no_data() {
        let empty = json!([]);
        let result = normalize(Provider::RestStatements, &empty, &empty, &empty);
        assert!(matches!(result, Err(StatementError::NoData { .. })));

        let result = normalize(Provider::TickerLibrary, &json!({}), &Value::Null, &json!({}));
        assert!(matches!(
            result,
            Err(StatementError::NoData {
                provider: Provider::TickerLibrary
            })
        ));
    }

    #[test]
    fn test_years_descending_and_unique() {
        let income = json!([
            {"calendarYear": "2021", "revenue": 800},
            {"calendarYear": "2023", "revenue": 1000},
            {"calendarYear": "2022", "revenue": 900},
            {"calendarYear": "2023", "revenue": 5}
        ]);
        let balance = json!([
            {"calendarYear": 2022, "totalAssets": 3000},
            {"calendarYear": 2020, "totalAssets": 2500}
        ]);

        let records = normalize(Provider::RestStatements, &income, &balance, &json!([])).unwrap();
        let years: Vec<i32> = records.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2023, 2022, 2021, 2020]);

        // First value seen for a year wins.
        assert_eq!(records[0].revenue, Some(1000.0));
        assert_eq!(records[1].total_assets, Some(3000.0));
        assert_eq!(records[3].revenue, None);
    }

    #[test]
    fn test_yearless_records_align_by_position() {
        let income = json!([
            {"calendarYear": 2023, "revenue": 1000},
            {"calendarYear": 2022, "revenue": 900}
        ]);
        let cashflow = json!([
            {"operatingCashFlow": 150, "capitalExpenditure": 50},
            {"operatingCashFlow": 120, "capitalExpenditure": 40},
            {"operatingCashFlow": 1, "capitalExpenditure": 1}
        ]);

        let records =
            normalize(Provider::RestStatements, &income, &Value::Null, &cashflow).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].operating_cash_flow, Some(150.0));
        assert_eq!(records[1].capital_expenditure, Some(40.0));
    }

    #[test]
    fn test_position_survives_skipped_records() {
        let income = json!([
            {"calendarYear": 2023, "revenue": 1000},
            {"calendarYear": 2022, "revenue": "garbage"},
            {"calendarYear": 2021, "revenue": 700}
        ]);
        let cashflow = json!([
            {"operatingCashFlow": 150},
            {"operatingCashFlow": 120},
            {"operatingCashFlow": 90}
        ]);

        let records =
            normalize(Provider::RestStatements, &income, &json!([]), &cashflow).unwrap();
        let years: Vec<i32> = records.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2023, 2022, 2021]);

        // The malformed income record is gone, its year still anchors cash flow.
        assert_eq!(records[1].revenue, None);
        assert_eq!(records[1].operating_cash_flow, Some(120.0));
        assert_eq!(records[2].revenue, Some(700.0));
        assert_eq!(records[2].operating_cash_flow, Some(90.0));
    }

    #[test]
    fn test_unreadable_record_without_year_gives_no_anchor() {
        let income = json!([
            {"calendarYear": 2023, "revenue": 1000},
            "not a record"
        ]);
        let cashflow = json!([{"operatingCashFlow": 150}, {"operatingCashFlow": 120}]);

        let records =
            normalize(Provider::RestStatements, &income, &json!([]), &cashflow).unwrap();
        let years: Vec<i32> = records.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2023]);
    }

    #[test]
    fn test_all_null_records_signal_no_data() {
        let income = json!([{"calendarYear": 2023, "revenue": null}]);
        let result = normalize(Provider::RestStatements, &income, &json!([]), &json!([]));
        assert!(matches!(result, Err(StatementError::NoData { .. })));

        let frame = json!({"2023-09-30": {"Total Revenue": null}});
        let result = normalize(Provider::TickerLibrary, &frame, &json!({}), &Value::Null);
        assert!(matches!(result, Err(StatementError::NoData { .. })));
    }

    #[test]
    fn test_empty_years_dropped_alongside_real_ones() {
        let frame = json!({
            "2023-09-30": {"Total Revenue": 500.0},
            "2019-09-30": {"Total Revenue": null, "Net Income": null}
        });
        let records = normalize(Provider::TickerLibrary, &frame, &Value::Null, &Value::Null).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].year, 2023);
    }

    #[test]
    fn test_yearless_only_payload_is_no_data() {
        let cashflow = json!([{"operatingCashFlow": 150, "capitalExpenditure": 50}]);
        let result = normalize(Provider::RestStatements, &json!([]), &json!([]), &cashflow);
        assert!(matches!(result, Err(StatementError::NoData { .. })));
    }

    #[test]
    fn test_category_fields_stay_in_their_statement() {
        let income = json!([{"calendarYear": 2023, "revenue": 10, "totalAssets": 99}]);
        let records =
            normalize(Provider::RestStatements, &income, &json!([]), &json!([])).unwrap();
        assert_eq!(records[0].revenue, Some(10.0));
        assert_eq!(records[0].total_assets, None);
    }
}
