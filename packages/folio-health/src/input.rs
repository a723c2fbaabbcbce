//! Parsing of user-supplied portfolio, allocation and forecast inputs.

use crate::portfolio::ForecastInput;
use crate::types::{merge_holdings, Holding};
use crate::{Error, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Parse a two-column holdings CSV (`Ticker`, `Shares`).
///
/// Header names are trimmed and matched case-insensitively; extra columns are
/// ignored. Tickers are upper-cased. Repeated tickers are merged by summing
/// their shares.
pub fn parse_holdings_csv<R: Read>(reader: R) -> Result<Vec<Holding>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::InvalidInput(format!("Missing '{}' column", name)))
    };
    let ticker_idx = column("Ticker")?;
    let shares_idx = column("Shares")?;

    let mut parsed = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        // header is line 1
        let line = row + 2;

        let ticker = record.get(ticker_idx).unwrap_or_default().to_uppercase();
        if ticker.is_empty() {
            return Err(Error::InvalidInput(format!("Line {}: empty ticker", line)));
        }

        let raw_shares = record.get(shares_idx).unwrap_or_default();
        let shares: f64 = raw_shares.parse().map_err(|_| {
            Error::InvalidInput(format!("Line {}: invalid share count '{}'", line, raw_shares))
        })?;
        if !shares.is_finite() || shares < 0.0 {
            return Err(Error::InvalidInput(format!(
                "Line {}: share count must be a non-negative number, got {}",
                line, raw_shares
            )));
        }

        parsed.push(Holding::new(&ticker, shares));
    }

    let holdings = merge_holdings(parsed);
    tracing::debug!("Parsed {} holdings", holdings.len());
    Ok(holdings)
}

/// Parse a holdings CSV file.
pub fn read_holdings_file(path: impl AsRef<Path>) -> Result<Vec<Holding>> {
    let file = std::fs::File::open(path.as_ref())?;
    parse_holdings_csv(file)
}

/// Parse `TICKER:PERCENT` pairs separated by commas, e.g. `AAPL:40, MSFT:60`.
///
/// Percentages need not sum to 100 but must be non-negative. Blank entries are
/// skipped; a repeated ticker keeps its last value.
pub fn parse_target_allocation(spec: &str) -> Result<HashMap<String, f64>> {
    let mut targets = HashMap::new();
    for entry in entries(spec) {
        let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
        let [ticker, pct] = parts.as_slice() else {
            return Err(Error::InvalidInput(format!(
                "Allocation entry '{}' must look like TICKER:PERCENT",
                entry
            )));
        };
        let ticker = parse_ticker(ticker, entry)?;
        let pct = parse_number(pct, entry, "percentage")?;
        if pct < 0.0 {
            return Err(Error::InvalidInput(format!(
                "Allocation entry '{}' has a negative percentage",
                entry
            )));
        }
        targets.insert(ticker, pct);
    }
    Ok(targets)
}

/// Parse `TICKER:PERCENT_CHANGE[:SHARES]` entries separated by commas,
/// e.g. `AAPL:10:20, MSFT:-5`.
///
/// Omitted shares are left as `None` for the caller's default.
pub fn parse_forecast_spec(spec: &str) -> Result<Vec<ForecastInput>> {
    let mut inputs = Vec::new();
    for entry in entries(spec) {
        let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
        let (ticker, change, shares) = match parts.as_slice() {
            [ticker, change] => (*ticker, *change, None),
            [ticker, change, shares] => (*ticker, *change, Some(*shares)),
            _ => {
                return Err(Error::InvalidInput(format!(
                    "Forecast entry '{}' must look like TICKER:PERCENT_CHANGE[:SHARES]",
                    entry
                )))
            }
        };

        let ticker = parse_ticker(ticker, entry)?;
        let change = parse_number(change, entry, "percent change")?;
        let shares = shares
            .map(|s| parse_number(s, entry, "share count"))
            .transpose()?;
        if shares.is_some_and(|s| s < 0.0) {
            return Err(Error::InvalidInput(format!(
                "Forecast entry '{}' has a negative share count",
                entry
            )));
        }

        inputs.push(ForecastInput::new(&ticker, change, shares));
    }
    Ok(inputs)
}

fn entries(spec: &str) -> impl Iterator<Item = &str> {
    spec.split(',').map(str::trim).filter(|e| !e.is_empty())
}

fn parse_ticker(raw: &str, entry: &str) -> Result<String> {
    if raw.is_empty() {
        return Err(Error::InvalidInput(format!("Entry '{}' has no ticker", entry)));
    }
    Ok(raw.to_uppercase())
}

fn parse_number(raw: &str, entry: &str, what: &str) -> Result<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::InvalidInput(format!("Entry '{}' has an invalid {}: '{}'", entry, what, raw)))
}
