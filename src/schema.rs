use crate::error::{Result, StatementError};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_HORIZON: usize = 5;
pub const DEFAULT_WACC_PERCENT: f64 = 8.0;
pub const DEFAULT_TERMINAL_GROWTH_PERCENT: f64 = 2.5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    #[schemars(
        description = "Financial statement REST API. Each statement is a JSON array of objects carrying an explicit calendar year field."
    )]
    RestStatements,

    #[schemars(
        description = "Ticker-data library statement frame. Each statement is a JSON object keyed by period column label (e.g. '2023-09-30'), whose values map row labels to amounts."
    )]
    TickerLibrary,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::RestStatements => write!(f, "rest-statements"),
            Provider::TickerLibrary => write!(f, "ticker-library"),
        }
    }
}

/// One fiscal year of statement line items plus the metrics derived from them.
///
/// Line items are `None` when the provider did not supply them. Derived fields
/// stay `None` until [`crate::derive_metrics`] runs, and remain `None` whenever
/// their inputs are missing or their denominator is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct YearRecord {
    #[schemars(description = "Fiscal year; unique within a series")]
    pub year: i32,

    pub revenue: Option<f64>,
    pub gross_profit: Option<f64>,
    pub ebitda: Option<f64>,
    pub net_income: Option<f64>,
    pub operating_cash_flow: Option<f64>,
    pub capital_expenditure: Option<f64>,
    pub total_debt: Option<f64>,
    pub cash_and_equivalents: Option<f64>,
    pub total_assets: Option<f64>,
    pub total_equity: Option<f64>,
    pub total_current_assets: Option<f64>,
    pub total_current_liabilities: Option<f64>,

    #[serde(default)]
    #[schemars(description = "Operating cash flow minus capital expenditure. Always derived, never sourced.")]
    pub free_cash_flow: Option<f64>,
    #[serde(default)]
    pub gross_margin: Option<f64>,
    #[serde(default)]
    pub ebitda_margin: Option<f64>,
    #[serde(default)]
    pub net_margin: Option<f64>,
    #[serde(default)]
    pub return_on_equity: Option<f64>,
    #[serde(default)]
    pub return_on_assets: Option<f64>,
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
    #[serde(default)]
    pub current_ratio: Option<f64>,

    #[serde(default)]
    #[schemars(description = "Sum of per-share dividends paid in this calendar year; 0 when none were paid")]
    pub dividends_paid: f64,
}

impl YearRecord {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            revenue: None,
            gross_profit: None,
            ebitda: None,
            net_income: None,
            operating_cash_flow: None,
            capital_expenditure: None,
            total_debt: None,
            cash_and_equivalents: None,
            total_assets: None,
            total_equity: None,
            total_current_assets: None,
            total_current_liabilities: None,
            free_cash_flow: None,
            gross_margin: None,
            ebitda_margin: None,
            net_margin: None,
            return_on_equity: None,
            return_on_assets: None,
            debt_to_equity: None,
            current_ratio: None,
            dividends_paid: 0.0,
        }
    }

    /// True when no statement line item is present.
    pub fn is_empty(&self) -> bool {
        self.line_items().iter().all(|(_, v)| v.is_none())
    }

    pub fn line_items(&self) -> [(LineItem, Option<f64>); 12] {
        [
            (LineItem::Revenue, self.revenue),
            (LineItem::GrossProfit, self.gross_profit),
            (LineItem::Ebitda, self.ebitda),
            (LineItem::NetIncome, self.net_income),
            (LineItem::OperatingCashFlow, self.operating_cash_flow),
            (LineItem::CapitalExpenditure, self.capital_expenditure),
            (LineItem::TotalDebt, self.total_debt),
            (LineItem::CashAndEquivalents, self.cash_and_equivalents),
            (LineItem::TotalAssets, self.total_assets),
            (LineItem::TotalEquity, self.total_equity),
            (LineItem::TotalCurrentAssets, self.total_current_assets),
            (LineItem::TotalCurrentLiabilities, self.total_current_liabilities),
        ]
    }

    pub fn slot_mut(&mut self, item: LineItem) -> &mut Option<f64> {
        match item {
            LineItem::Revenue => &mut self.revenue,
            LineItem::GrossProfit => &mut self.gross_profit,
            LineItem::Ebitda => &mut self.ebitda,
            LineItem::NetIncome => &mut self.net_income,
            LineItem::OperatingCashFlow => &mut self.operating_cash_flow,
            LineItem::CapitalExpenditure => &mut self.capital_expenditure,
            LineItem::TotalDebt => &mut self.total_debt,
            LineItem::CashAndEquivalents => &mut self.cash_and_equivalents,
            LineItem::TotalAssets => &mut self.total_assets,
            LineItem::TotalEquity => &mut self.total_equity,
            LineItem::TotalCurrentAssets => &mut self.total_current_assets,
            LineItem::TotalCurrentLiabilities => &mut self.total_current_liabilities,
        }
    }

    /// Fills every line item still missing here from `other`.
    pub fn absorb(&mut self, other: &YearRecord) {
        for (item, value) in other.line_items() {
            let slot = self.slot_mut(item);
            if slot.is_none() {
                *slot = value;
            }
        }
    }
}

/// Source line items, independent of any provider's naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum LineItem {
    Revenue,
    GrossProfit,
    Ebitda,
    NetIncome,
    OperatingCashFlow,
    CapitalExpenditure,
    TotalDebt,
    CashAndEquivalents,
    TotalAssets,
    TotalEquity,
    TotalCurrentAssets,
    TotalCurrentLiabilities,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DividendEvent {
    #[schemars(description = "Payment date in YYYY-MM-DD format")]
    pub date: NaiveDate,
    pub amount_per_share: f64,
}

fn default_horizon() -> usize {
    DEFAULT_HORIZON
}

fn default_wacc_percent() -> f64 {
    DEFAULT_WACC_PERCENT
}

fn default_terminal_growth_percent() -> f64 {
    DEFAULT_TERMINAL_GROWTH_PERCENT
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EngineConfig {
    #[schemars(description = "Which provider shape the raw statement payloads follow")]
    pub provider: Provider,

    #[serde(default = "default_horizon")]
    #[schemars(description = "Maximum number of most-recent free cash flow years handed to valuation. Defaults to 5.")]
    pub horizon: usize,

    #[serde(default = "default_wacc_percent")]
    #[schemars(description = "Discount rate for the valuation step, in percent. Defaults to 8.0.")]
    pub wacc_percent: f64,

    #[serde(default = "default_terminal_growth_percent")]
    #[schemars(description = "Perpetual growth rate after the horizon, in percent. Must be below the discount rate. Defaults to 2.5.")]
    pub terminal_growth_percent: f64,
}

impl EngineConfig {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            horizon: DEFAULT_HORIZON,
            wacc_percent: DEFAULT_WACC_PERCENT,
            terminal_growth_percent: DEFAULT_TERMINAL_GROWTH_PERCENT,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(StatementError::InvalidConfig(
                "horizon must be at least one year".to_string(),
            ));
        }
        if !self.wacc_percent.is_finite() || !self.terminal_growth_percent.is_finite() {
            return Err(StatementError::InvalidConfig(format!(
                "rates must be finite (wacc {}, terminal growth {})",
                self.wacc_percent, self.terminal_growth_percent
            )));
        }
        if self.terminal_growth_percent >= self.wacc_percent {
            return Err(StatementError::InvalidConfig(format!(
                "terminal growth {}% must be below wacc {}%",
                self.terminal_growth_percent, self.wacc_percent
            )));
        }
        Ok(())
    }

    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(EngineConfig)
    }

    pub fn schema_as_json() -> Result<String> {
        Ok(serde_json::to_string_pretty(&Self::json_schema())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_generation() {
        let schema_json = EngineConfig::schema_as_json().unwrap();
        assert!(schema_json.contains("provider"));
        assert!(schema_json.contains("horizon"));
        assert!(schema_json.contains("terminal_growth_percent"));
    }

    #[test]
    fn test_config_defaults_from_json() {
        let config: EngineConfig = serde_json::from_str(r#"{"provider": "ticker-library"}"#).unwrap();
        assert_eq!(config.provider, Provider::TickerLibrary);
        assert_eq!(config.horizon, 5);
        assert_eq!(config.wacc_percent, 8.0);
        assert_eq!(config.terminal_growth_percent, 2.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::new(Provider::RestStatements);
        config.horizon = 0;
        assert!(matches!(config.validate(), Err(StatementError::InvalidConfig(_))));

        let mut config = EngineConfig::new(Provider::RestStatements);
        config.terminal_growth_percent = 9.0;
        assert!(matches!(config.validate(), Err(StatementError::InvalidConfig(_))));

        let mut config = EngineConfig::new(Provider::RestStatements);
        config.wacc_percent = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_year_record_serializes_camel_case() {
        let mut record = YearRecord::new(2023);
        record.operating_cash_flow = Some(150.0);

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"operatingCashFlow\":150.0"));
        assert!(json.contains("\"dividendsPaid\":0.0"));

        let back: YearRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_absorb_keeps_existing_values() {
        let mut first = YearRecord::new(2022);
        first.revenue = Some(10.0);

        let mut second = YearRecord::new(2022);
        second.revenue = Some(99.0);
        second.total_assets = Some(50.0);

        first.absorb(&second);
        assert_eq!(first.revenue, Some(10.0));
        assert_eq!(first.total_assets, Some(50.0));
        assert!(!first.is_empty());
        assert!(YearRecord::new(2022).is_empty());
    }
}
