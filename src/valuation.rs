use crate::error::{Result, StatementError};
use crate::schema::{EngineConfig, YearRecord};
use log::{debug, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Picks up to `horizon` free cash flow values, most recent first, for the
/// discounted cash flow step.
///
/// Missing values become 0 so the series can be summed and discounted. A
/// window that is empty or sums to zero is reported as
/// [`StatementError::InsufficientValuationData`].
pub fn select_valuation_inputs(records: &[YearRecord], horizon: usize) -> Result<Vec<f64>> {
    let mut ordered: Vec<&YearRecord> = records.iter().collect();
    ordered.sort_by(|a, b| b.year.cmp(&a.year));

    let window: Vec<f64> = ordered
        .into_iter()
        .take(horizon)
        .map(|record| record.free_cash_flow.unwrap_or(0.0))
        .collect();

    let total: f64 = window.iter().sum();
    if window.is_empty() || total == 0.0 {
        warn!(
            "Free cash flow window of {} value(s) over horizon {} sums to zero",
            window.len(),
            horizon
        );
        return Err(StatementError::InsufficientValuationData { horizon });
    }

    debug!("Selected {} free cash flow values for valuation", window.len());
    Ok(window)
}

/// Everything the valuation collaborator needs to run a DCF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValuationInputs {
    #[schemars(description = "Free cash flows, most recent year first")]
    pub free_cash_flows: Vec<f64>,
    pub wacc_percent: f64,
    pub terminal_growth_percent: f64,
}

impl ValuationInputs {
    pub fn from_records(records: &[YearRecord], config: &EngineConfig) -> Result<Self> {
        let free_cash_flows = select_valuation_inputs(records, config.horizon)?;
        Ok(Self {
            free_cash_flows,
            wacc_percent: config.wacc_percent,
            terminal_growth_percent: config.terminal_growth_percent,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValuationOutcome {
    Ready(ValuationInputs),
    InsufficientData,
}

impl ValuationOutcome {
    pub fn inputs(&self) -> Option<&ValuationInputs> {
        match self {
            ValuationOutcome::Ready(inputs) => Some(inputs),
            ValuationOutcome::InsufficientData => None,
        }
    }
}
