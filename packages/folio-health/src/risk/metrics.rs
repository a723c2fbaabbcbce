//! Per-ticker risk statistics from daily returns.

use crate::math::{mean, sample_std_dev, TRADING_DAYS};

/// Convert an annual risk-free rate to its compounded daily equivalent.
///
/// `(1 + rf)^(1/252) - 1`
pub fn daily_risk_free_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / TRADING_DAYS) - 1.0
}

/// Annualized volatility: sample standard deviation of daily returns times sqrt(252).
///
/// Returned as a fraction (0.25 = 25%). `None` with fewer than two returns.
pub fn annualized_volatility(returns: &[f64]) -> Option<f64> {
    sample_std_dev(returns).map(|std| std * TRADING_DAYS.sqrt())
}

/// Annualized Sharpe ratio.
///
/// `mean(r - rf_daily) / std(r) * sqrt(252)`. `None` when the ratio is
/// undefined (fewer than two returns or zero variance).
pub fn sharpe_ratio(returns: &[f64], annual_risk_free_rate: f64) -> Option<f64> {
    let std = sample_std_dev(returns)?;
    if std < 1e-12 {
        return None;
    }

    let daily_rf = daily_risk_free_rate(annual_risk_free_rate);
    let excess = mean(returns)? - daily_rf;
    let sharpe = excess / std * TRADING_DAYS.sqrt();
    sharpe.is_finite().then_some(sharpe)
}
