use crate::error::Result;
use crate::schema::YearRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

const COLUMNS: [&str; 21] = [
    "Revenue",
    "Gross Profit",
    "EBITDA",
    "Net Income",
    "Operating CF",
    "CapEx",
    "Free Cash Flow",
    "Total Debt",
    "Cash & Equiv",
    "Total Assets",
    "Total Equity",
    "Current Assets",
    "Current Liabilities",
    "Current Ratio",
    "Gross Margin",
    "EBITDA Margin",
    "Net Margin",
    "ROE",
    "ROA",
    "Debt/Equity",
    "Dividends",
];

fn cells(r: &YearRecord) -> [Option<f64>; 21] {
    [
        r.revenue,
        r.gross_profit,
        r.ebitda,
        r.net_income,
        r.operating_cash_flow,
        r.capital_expenditure,
        r.free_cash_flow,
        r.total_debt,
        r.cash_and_equivalents,
        r.total_assets,
        r.total_equity,
        r.total_current_assets,
        r.total_current_liabilities,
        r.current_ratio,
        r.gross_margin,
        r.ebitda_margin,
        r.net_margin,
        r.return_on_equity,
        r.return_on_assets,
        r.debt_to_equity,
        Some(r.dividends_paid),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub year: i32,
    pub cells: Vec<Option<f64>>,
}

/// Column-labelled view of an enriched series for the reporting and export
/// collaborators. Row order follows the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialTable {
    headers: Vec<String>,
    rows: Vec<TableRow>,
}

impl FinancialTable {
    pub fn from_records(records: &[YearRecord]) -> Self {
        let headers = std::iter::once("Year")
            .chain(COLUMNS)
            .map(str::to_string)
            .collect();

        let rows = records
            .iter()
            .map(|record| TableRow {
                year: record.year,
                cells: cells(record).to_vec(),
            })
            .collect();

        Self { headers, rows }
    }

    /// Includes the leading `Year` column.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn column(&self, header: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.headers.iter().skip(1).position(|h| h == header)?;
        Some(self.rows.iter().map(|row| row.cells[idx]).collect())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn format_cell(value: Option<f64>) -> String {
    match value {
        None => "-".to_string(),
        Some(v) if v != 0.0 && v.abs() < 10.0 => format!("{:.4}", v),
        Some(v) => format!("{:.2}", v),
    }
}

impl fmt::Display for FinancialTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                std::iter::once(row.year.to_string())
                    .chain(row.cells.iter().map(|c| format_cell(*c)))
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                body.iter()
                    .map(|cells| cells[i].len())
                    .chain(std::iter::once(header.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header_line: Vec<String> = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| format!("{:>width$}", h, width = *w))
            .collect();
        writeln!(f, "{}", header_line.join("  "))?;

        for cells in &body {
            let line: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:>width$}", c, width = *w))
                .collect();
            writeln!(f, "{}", line.join("  "))?;
        }

        Ok(())
    }
}
