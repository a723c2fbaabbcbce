//! Pairwise correlation of return series.

use crate::math::pearson;
use crate::returns::ReturnSeries;
use serde::{Deserialize, Serialize};

/// Symmetric Pearson correlation matrix with a unit diagonal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CorrelationMatrix {
    /// Row/column labels
    pub tickers: Vec<String>,
    /// `values[i][j]` = corr(tickers[i], tickers[j])
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Correlate every pair of columns in the return table.
    pub fn from_returns(returns: &ReturnSeries) -> Self {
        let n = returns.tickers.len();
        let mut values = vec![vec![0.0; n]; n];

        for i in 0..n {
            values[i][i] = 1.0;
            for j in (i + 1)..n {
                let corr = pearson(&returns.columns[i], &returns.columns[j]);
                values[i][j] = corr;
                values[j][i] = corr;
            }
        }

        Self {
            tickers: returns.tickers.clone(),
            values,
        }
    }

    /// Correlation between two tickers.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        Some(self.values[i][j])
    }

    /// Mean correlation of a ticker with its peers, excluding the diagonal.
    ///
    /// `None` when the ticker is unknown or has no peers.
    pub fn average_correlation(&self, ticker: &str) -> Option<f64> {
        let i = self.index_of(ticker)?;
        let peers = self.tickers.len() - 1;
        if peers == 0 {
            return None;
        }
        let sum: f64 = self.values[i]
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, v)| v)
            .sum();
        Some(sum / peers as f64)
    }

    fn index_of(&self, ticker: &str) -> Option<usize> {
        self.tickers.iter().position(|t| t == ticker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::PriceHistory;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn returns_for(columns: &[(&str, Vec<f64>)]) -> ReturnSeries {
        let n = columns[0].1.len() as u32;
        let dates = (0..n)
            .map(|i| NaiveDate::from_ymd_opt(2024, 1, 1 + i).unwrap())
            .collect();
        let history = columns.iter().fold(PriceHistory::new(dates), |h, (t, p)| {
            h.with_column(t, p.iter().copied().map(Some).collect())
        });
        ReturnSeries::from_prices(&history)
    }

    #[test]
    fn test_matrix_is_symmetric_with_unit_diagonal() {
        let returns = returns_for(&[
            ("A", vec![100.0, 101.0, 99.0, 102.0, 103.0, 101.0]),
            ("B", vec![50.0, 50.6, 49.4, 51.0, 51.3, 50.1]),
            ("C", vec![10.0, 9.8, 10.3, 9.9, 9.7, 10.2]),
        ]);
        let matrix = CorrelationMatrix::from_returns(&returns);

        for i in 0..3 {
            assert_eq!(matrix.values[i][i], 1.0);
            for j in 0..3 {
                assert_abs_diff_eq!(matrix.values[i][j], matrix.values[j][i], epsilon = 1e-15);
                assert!(matrix.values[i][j] >= -1.0 && matrix.values[i][j] <= 1.0);
            }
        }
        assert!(matrix.get("A", "B").unwrap() > 0.9);
        assert!(matrix.get("A", "C").unwrap() < 0.0);
    }

    #[test]
    fn test_average_correlation_excludes_self() {
        let matrix = CorrelationMatrix {
            tickers: vec!["A".into(), "B".into(), "C".into()],
            values: vec![
                vec![1.0, 0.5, 0.1],
                vec![0.5, 1.0, -0.3],
                vec![0.1, -0.3, 1.0],
            ],
        };

        assert_abs_diff_eq!(matrix.average_correlation("A").unwrap(), 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(matrix.average_correlation("B").unwrap(), 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(matrix.average_correlation("C").unwrap(), -0.1, epsilon = 1e-12);
        assert!(matrix.average_correlation("Z").is_none());
    }

    #[test]
    fn test_single_ticker_has_no_average() {
        let returns = returns_for(&[("A", vec![1.0, 2.0, 3.0])]);
        let matrix = CorrelationMatrix::from_returns(&returns);

        assert_eq!(matrix.values, vec![vec![1.0]]);
        assert!(matrix.average_correlation("A").is_none());
    }
}
