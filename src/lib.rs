//! # Statement Metrics
//!
//! A library for turning multi-year financial statements from heterogeneous
//! providers into a normalized, derived-metrics time series ready for a
//! discounted cash flow valuation and for narrative reporting.
//!
//! ## Core Concepts
//!
//! - **Canonical Record**: One fiscal year of line items, independent of provider naming
//! - **Null Propagation**: Missing line items stay `None`; ratios with a missing or zero denominator stay `None`
//! - **Derived Free Cash Flow**: Always operating cash flow minus capital expenditure, never sourced
//! - **Dividend Totals**: Per-share payments summed by calendar year and merged onto matching years
//! - **Valuation Window**: Up to `horizon` most recent free cash flows, with gaps read as zero
//!
//! ## Example
//!
//! ```rust,ignore
//! use statement_metrics::*;
//! use serde_json::json;
//!
//! let payload = StatementPayload {
//!     income: json!([{"calendarYear": "2023", "revenue": 1000, "grossProfit": 400, "netIncome": 100}]),
//!     balance: json!([]),
//!     cashflow: json!([{"operatingCashFlow": 150, "capitalExpenditure": 50}]),
//!     dividends: json!({"historical": [{"date": "2023-06-01", "dividend": 2}]}),
//! };
//!
//! let config = EngineConfig::new(Provider::RestStatements);
//! let analysis = analyze_statements(&config, &payload).unwrap();
//! println!("{}", FinancialTable::from_records(&analysis.records));
//! ```

pub mod adapter;
pub mod dividends;
pub mod error;
pub mod metrics;
pub mod schema;
pub mod table;
pub mod utils;
pub mod valuation;

pub use adapter::{adapter_for, normalize, StatementAdapter, StatementCategory};
pub use dividends::{aggregate_dividends, parse_dividend_events, DividendTotals};
pub use error::{Result, StatementError};
pub use metrics::{derive_metrics, safe_ratio};
pub use schema::*;
pub use table::{FinancialTable, TableRow};
pub use valuation::{select_valuation_inputs, ValuationInputs, ValuationOutcome};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw provider payloads for one company, exactly as fetched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementPayload {
    #[serde(default)]
    pub income: Value,
    #[serde(default)]
    pub balance: Value,
    #[serde(default)]
    pub cashflow: Value,
    #[serde(default)]
    pub dividends: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementAnalysis {
    pub provider: Provider,
    /// Enriched records, most recent year first.
    pub records: Vec<YearRecord>,
    pub valuation: ValuationOutcome,
}

impl StatementAnalysis {
    pub fn table(&self) -> FinancialTable {
        FinancialTable::from_records(&self.records)
    }
}

pub struct StatementAnalyzer;

impl StatementAnalyzer {
    pub fn analyze(config: &EngineConfig, payload: &StatementPayload) -> Result<StatementAnalysis> {
        config.validate()?;

        info!("Analyzing statements from provider: {}", config.provider);

        let records = normalize(
            config.provider,
            &payload.income,
            &payload.balance,
            &payload.cashflow,
        )?;
        debug!(
            "Normalized {} year records ({}..={})",
            records.len(),
            records.last().map(|r| r.year).unwrap_or_default(),
            records.first().map(|r| r.year).unwrap_or_default()
        );

        let events = parse_dividend_events(config.provider, &payload.dividends);
        let dividend_totals = aggregate_dividends(&events);

        let records = derive_metrics(&records, &dividend_totals);

        let valuation = match ValuationInputs::from_records(&records, config) {
            Ok(inputs) => ValuationOutcome::Ready(inputs),
            Err(StatementError::InsufficientValuationData { horizon }) => {
                warn!(
                    "Skipping valuation inputs: no free cash flow over the last {} years",
                    horizon
                );
                ValuationOutcome::InsufficientData
            }
            Err(e) => return Err(e),
        };

        Ok(StatementAnalysis {
            provider: config.provider,
            records,
            valuation,
        })
    }
}

pub fn analyze_statements(
    config: &EngineConfig,
    payload: &StatementPayload,
) -> Result<StatementAnalysis> {
    StatementAnalyzer::analyze(config, payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn approx(actual: Option<f64>, expected: f64) {
        let value = actual.expect("expected a value");
        assert!((value - expected).abs() < 1e-9, "expected {}, got {}", expected, value);
    }

    #[test]
    fn test_end_to_end_single_year() {
        let payload = StatementPayload {
            income: json!([{"calendarYear": 2023, "revenue": 1000, "grossProfit": 400, "netIncome": 100}]),
            balance: json!([]),
            cashflow: json!([{"operatingCashFlow": 150, "capitalExpenditure": 50}]),
            dividends: json!({"historical": [
                {"date": "2023-06-01", "dividend": 2},
                {"date": "2023-12-01", "dividend": 2}
            ]}),
        };

        let config = EngineConfig::new(Provider::RestStatements);
        let analysis = analyze_statements(&config, &payload).unwrap();

        assert_eq!(analysis.records.len(), 1);
        let record = &analysis.records[0];
        assert_eq!(record.year, 2023);
        approx(record.free_cash_flow, 100.0);
        approx(record.gross_margin, 0.4);
        approx(record.net_margin, 0.1);
        assert_eq!(record.dividends_paid, 4.0);
        assert_eq!(record.return_on_equity, None);
        assert_eq!(record.debt_to_equity, None);
        assert_eq!(record.current_ratio, None);

        let inputs = analysis.valuation.inputs().unwrap();
        assert_eq!(inputs.free_cash_flows, vec![100.0]);
    }

    #[test]
    fn test_no_data_fails_the_analysis() {
        let payload = StatementPayload {
            income: json!([]),
            balance: json!([]),
            cashflow: json!([]),
            dividends: json!({"historical": [{"date": "2023-06-01", "dividend": 2}]}),
        };
        let config = EngineConfig::new(Provider::RestStatements);
        assert!(matches!(
            analyze_statements(&config, &payload),
            Err(StatementError::NoData { .. })
        ));
    }

    #[test]
    fn test_missing_cash_flow_yields_insufficient_valuation() {
        let payload = StatementPayload {
            income: json!([{"calendarYear": 2023, "revenue": 1000}]),
            ..Default::default()
        };
        let config = EngineConfig::new(Provider::RestStatements);
        let analysis = analyze_statements(&config, &payload).unwrap();

        assert_eq!(analysis.records.len(), 1);
        assert_eq!(analysis.records[0].dividends_paid, 0.0);
        assert_eq!(analysis.valuation, ValuationOutcome::InsufficientData);
    }

    #[test]
    fn test_invalid_config_is_rejected_before_work() {
        let mut config = EngineConfig::new(Provider::TickerLibrary);
        config.horizon = 0;
        let result = analyze_statements(&config, &StatementPayload::default());
        assert!(matches!(result, Err(StatementError::InvalidConfig(_))));
    }
}
