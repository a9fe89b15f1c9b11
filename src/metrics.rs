use crate::dividends::DividendTotals;
use crate::schema::YearRecord;
use log::{debug, warn};

/// Divides only when both sides are present and the denominator is non-zero.
/// Never yields an infinite or NaN value.
pub fn safe_ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let denominator = denominator.filter(|d| *d != 0.0)?;
    let ratio = numerator? / denominator;
    ratio.is_finite().then_some(ratio)
}

pub fn free_cash_flow(record: &YearRecord) -> Option<f64> {
    Some(record.operating_cash_flow? - record.capital_expenditure?)
}

/// Computes every derived field of one record. Any derived value already on
/// the input is discarded and recomputed from the line items.
pub fn enrich_record(record: &YearRecord, dividend_totals: &DividendTotals) -> YearRecord {
    let mut enriched = record.clone();

    enriched.free_cash_flow = free_cash_flow(record);

    enriched.gross_margin = safe_ratio(record.gross_profit, record.revenue);
    enriched.ebitda_margin = safe_ratio(record.ebitda, record.revenue);
    enriched.net_margin = safe_ratio(record.net_income, record.revenue);
    enriched.return_on_equity = safe_ratio(record.net_income, record.total_equity);
    enriched.return_on_assets = safe_ratio(record.net_income, record.total_assets);
    enriched.debt_to_equity = safe_ratio(record.total_debt, record.total_equity);
    enriched.current_ratio =
        safe_ratio(record.total_current_assets, record.total_current_liabilities);

    enriched.dividends_paid = dividend_totals.get(&record.year).copied().unwrap_or(0.0);

    enriched
}

/// Returns a new, year-descending series with free cash flow, ratios and
/// dividends filled in. The input is left untouched and no year is dropped
/// for lack of data.
pub fn derive_metrics(records: &[YearRecord], dividend_totals: &DividendTotals) -> Vec<YearRecord> {
    let mut enriched: Vec<YearRecord> = records
        .iter()
        .map(|record| enrich_record(record, dividend_totals))
        .collect();

    enriched.sort_by(|a, b| b.year.cmp(&a.year));

    let before = enriched.len();
    enriched.dedup_by_key(|record| record.year);
    if enriched.len() != before {
        warn!(
            "Dropped {} duplicate year record(s) while deriving metrics",
            before - enriched.len()
        );
    }

    debug!(
        "Derived metrics for {} years ({} with free cash flow)",
        enriched.len(),
        enriched.iter().filter(|r| r.free_cash_flow.is_some()).count()
    );

    enriched
}
