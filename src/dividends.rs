use crate::adapter::adapter_for;
use crate::schema::{DividendEvent, Provider};
use crate::utils::calendar_year;
use log::{debug, warn};
use serde_json::Value;
use std::collections::BTreeMap;

/// Calendar year to total per-share dividends paid in that year.
pub type DividendTotals = BTreeMap<i32, f64>;

/// Sums per-share dividend payments by the calendar year of their payment date.
///
/// Years outside any statement range are kept; the metrics step simply never
/// looks them up.
pub fn aggregate_dividends(events: &[DividendEvent]) -> DividendTotals {
    let mut totals = DividendTotals::new();
    for event in events {
        *totals.entry(calendar_year(event.date)).or_insert(0.0) += event.amount_per_share;
    }
    totals
}

/// Reads dividend payment events from a provider payload, skipping events
/// whose date or amount cannot be parsed.
pub fn parse_dividend_events(provider: Provider, raw: &Value) -> Vec<DividendEvent> {
    let events: Vec<DividendEvent> = adapter_for(provider)
        .parse_dividends(raw)
        .into_iter()
        .filter_map(|event| match event {
            Ok(event) => Some(event),
            Err(e) => {
                warn!("Skipping dividend event from {}: {}", provider, e);
                None
            }
        })
        .collect();

    debug!("{} dividend events parsed from {}", events.len(), provider);
    events
}
