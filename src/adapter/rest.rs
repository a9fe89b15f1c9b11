use super::{
    lookup_amount, PartialRecord, RecordOutcome, SkippedRecord, StatementAdapter,
    StatementCategory,
};
use crate::error::{Result, StatementError};
use crate::schema::{DividendEvent, LineItem, Provider};
use crate::utils::{parse_amount, parse_date_label, parse_year};
use log::warn;
use serde_json::{Map, Value};

/// Adapter for a statement REST API that returns one JSON object per fiscal
/// year, with camelCase field names and an explicit `calendarYear`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestStatementAdapter;

const YEAR_KEYS: [&str; 2] = ["calendarYear", "fiscalYear"];

fn field_keys(item: LineItem) -> &'static [&'static str] {
    match item {
        LineItem::Revenue => &["revenue"],
        LineItem::GrossProfit => &["grossProfit"],
        LineItem::Ebitda => &["ebitda"],
        LineItem::NetIncome => &["netIncome"],
        LineItem::OperatingCashFlow => &[
            "operatingCashFlow",
            "netCashProvidedByOperatingActivities",
        ],
        LineItem::CapitalExpenditure => &["capitalExpenditure"],
        LineItem::TotalDebt => &["totalDebt"],
        LineItem::CashAndEquivalents => &["cashAndCashEquivalents", "cashAndEquivalents"],
        LineItem::TotalAssets => &["totalAssets"],
        LineItem::TotalEquity => &["totalStockholdersEquity", "totalEquity"],
        LineItem::TotalCurrentAssets => &["totalCurrentAssets"],
        LineItem::TotalCurrentLiabilities => &["totalCurrentLiabilities"],
    }
}

fn record_year(object: &Map<String, Value>) -> Option<i32> {
    YEAR_KEYS
        .iter()
        .filter_map(|key| object.get(*key))
        .find_map(parse_year)
        .or_else(|| object.get("date").and_then(parse_year))
}

impl RestStatementAdapter {
    fn parse_record(
        &self,
        category: StatementCategory,
        position: usize,
        record: &Value,
    ) -> RecordOutcome {
        let Some(object) = record.as_object() else {
            return Err(SkippedRecord {
                position,
                year: None,
                error: StatementError::MalformedInput(format!(
                    "record #{} is not an object",
                    position
                )),
            });
        };

        let year = record_year(object);

        let values = category
            .line_items()
            .iter()
            .map(|item| Ok((*item, lookup_amount(object, field_keys(*item))?)))
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
    }
}

impl StatementAdapter for RestStatementAdapter {
    fn provider(&self) -> Provider {
        Provider::RestStatements
    }

    fn parse_statement(
        &self,
        category: StatementCategory,
        raw: &Value,
    ) -> Vec<RecordOutcome> {
        match raw {
            Value::Array(records) => records
                .iter()
                .enumerate()
                .map(|(position, record)| self.parse_record(category, position, record))
                .collect(),
            Value::Null => Vec::new(),
            other => {
                warn!(
                    "Ignoring {} payload from {}: expected an array, found {}",
                    category,
                    self.provider(),
                    json_kind(other)
                );
                Vec::new()
            }
        }
    }

    fn parse_dividends(&self, raw: &Value) -> Vec<Result<DividendEvent>> {
        let events = match raw {
            Value::Object(object) => match object.get("historical") {
                Some(Value::Array(events)) => events,
                _ => return Vec::new(),
            },
            Value::Array(events) => events,
            _ => return Vec::new(),
        };

        events.iter().map(parse_dividend_event).collect()
    }
}

fn parse_dividend_event(event: &Value) -> Result<DividendEvent> {
    let object = event.as_object().ok_or_else(|| {
        StatementError::MalformedInput("dividend event is not an object".to_string())
    })?;

    let date = match object.get("date") {
        Some(Value::String(label)) => parse_date_label(label)?,
        _ => {
            return Err(StatementError::MalformedInput(
                "dividend event has no date".to_string(),
            ))
        }
    };

    let mut amount = None;
    for key in ["dividend", "adjDividend"] {
        if let Some(value) = object.get(key) {
            amount = parse_amount(value)?;
            if amount.is_some() {
                break;
            }
        }
    }

    let amount_per_share = amount.ok_or_else(|| {
        StatementError::MalformedInput(format!("dividend event on {} has no amount", date))
    })?;

    Ok(DividendEvent {
        date,
        amount_per_share,
    })
}

pub(super) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
