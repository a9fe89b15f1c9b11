use super::rest::json_kind;
use super::{
    lookup_amount, PartialRecord, RecordOutcome, SkippedRecord, StatementAdapter,
    StatementCategory,
};
use crate::error::{Result, StatementError};
use crate::schema::{DividendEvent, LineItem, Provider};
use crate::utils::{parse_amount, parse_date_label, year_from_label};
use log::warn;
use serde_json::Value;

/// Adapter for a ticker-data library's statement frames.
///
/// A frame is a JSON object keyed by period column (`"2023-09-30"`), each
/// column holding row label to amount. The year only exists in the column
/// label.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickerFrameAdapter;

fn row_labels(item: LineItem) -> &'static [&'static str] {
    match item {
        LineItem::Revenue => &["Total Revenue", "Operating Revenue"],
        LineItem::GrossProfit => &["Gross Profit"],
        LineItem::Ebitda => &["EBITDA", "Normalized EBITDA"],
        LineItem::NetIncome => &["Net Income", "Net Income Common Stockholders"],
        LineItem::OperatingCashFlow => &[
            "Operating Cash Flow",
            "Cash Flow From Continuing Operating Activities",
        ],
        LineItem::CapitalExpenditure => &["Capital Expenditure"],
        LineItem::TotalDebt => &["Total Debt"],
        LineItem::CashAndEquivalents => &[
            "Cash And Cash Equivalents",
            "Cash Cash Equivalents And Short Term Investments",
        ],
        LineItem::TotalAssets => &["Total Assets"],
        LineItem::TotalEquity => &[
            "Stockholders Equity",
            "Total Equity Gross Minority Interest",
        ],
        LineItem::TotalCurrentAssets => &["Current Assets"],
        LineItem::TotalCurrentLiabilities => &["Current Liabilities"],
    }
}

impl StatementAdapter for TickerFrameAdapter {
    fn provider(&self) -> Provider {
        Provider::TickerLibrary
    }

    fn parse_statement(
        &self,
        category: StatementCategory,
        raw: &Value,
    ) -> Vec<RecordOutcome> {
        let columns = match raw {
            Value::Object(columns) => columns,
            Value::Null => return Vec::new(),
            other => {
                warn!(
                    "Ignoring {} frame from {}: expected an object, found {}",
                    category,
                    self.provider(),
                    json_kind(other)
                );
                return Vec::new();
            }
        };

        columns
            .iter()
            .enumerate()
            .map(|(position, (label, column))| {
                let year = year_from_label(label);
                let skip = |message: String| SkippedRecord {
                    position,
                    year,
                    error: StatementError::MalformedInput(message),
                };

                if year.is_none() {
                    return Err(skip(format!("column '{}' does not name a period", label)));
                }

                let rows = column
                    .as_object()
                    .ok_or_else(|| skip(format!("column '{}' is not a row mapping", label)))?;

                let values = category
                    .line_items()
                    .iter()
                    .map(|item| Ok((*item, lookup_amount(rows, row_labels(*item))?)))
                    .collect::<Result<Vec<_>>>()
                    .map_err(|error| SkippedRecord {
                        position,
                        year,
                        error,
                    })?;

                Ok(PartialRecord {
                    position,
                    year,
                    values,
                })
            })
            .collect()
    }

    fn parse_dividends(&self, raw: &Value) -> Vec<Result<DividendEvent>> {
        let Value::Object(series) = raw else {
            return Vec::new();
        };

        series
            .iter()
            .map(|(label, amount)| {
                let date = parse_date_label(label)?;
                let amount_per_share = parse_amount(amount)?.ok_or_else(|| {
                    StatementError::MalformedInput(format!(
                        "dividend on {} has no amount",
                        date
                    ))
                })?;
                Ok(DividendEvent {
                    date,
                    amount_per_share,
                })
            })
            .collect()
    }
}
