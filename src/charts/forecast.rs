//! Balance Forecasting
//!
//! Resamples the ledger into a month-end cumulative balance series and
//! projects it forward with a drift model: the mean month-over-month change
//! is carried forward, with a 95% band of ±1.96 standard deviations of the
//! monthly change accumulated per step.

use chrono::{Datelike, Duration, NaiveDate};

use crate::ledger::Ledger;

/// Two-sided 95% normal quantile
const Z_95: f64 = 1.96;

/// Values observed at consecutive month-ends
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlySeries {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl MonthlySeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn last(&self) -> Option<(NaiveDate, f64)> {
        Some((*self.dates.last()?, *self.values.last()?))
    }

    /// Month-over-month changes (one fewer than the number of points)
    pub fn changes(&self) -> Vec<f64> {
        self.values.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

/// Forecast of a cumulative series
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    pub dates: Vec<NaiveDate>,
    pub mean: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Last day of the month containing `date`
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

/// Last day of the month after the one containing `date`
fn next_month_end(date: NaiveDate) -> NaiveDate {
    month_end(month_end(date) + Duration::days(1))
}

/// Cumulative balance at every month-end between the first and last transaction
///
/// Uses the balance reported by the bank when a transaction carries one, and
/// the running sum of amounts otherwise. Months without transactions carry
/// the previous value forward.
pub fn observed_cumulative(ledger: &Ledger) -> MonthlySeries {
    let mut transactions: Vec<_> = ledger.transactions().iter().collect();
    if transactions.is_empty() {
        return MonthlySeries::default();
    }
    transactions.sort_by_key(|tx| tx.date);

    let mut running = 0.0;
    let mut points: Vec<(NaiveDate, f64)> = Vec::with_capacity(transactions.len());
    for tx in &transactions {
        running = tx.balance.unwrap_or(running + tx.amount);
        points.push((tx.date, running));
    }

    let mut series = MonthlySeries::default();
    let last_end = month_end(points[points.len() - 1].0);
    let mut current_end = month_end(points[0].0);
    let mut cursor = 0;
    let mut value = 0.0;

    while current_end <= last_end {
        while cursor < points.len() && points[cursor].0 <= current_end {
            value = points[cursor].1;
            cursor += 1;
        }
        series.dates.push(current_end);
        series.values.push(value);
        current_end = next_month_end(current_end);
    }

    series
}

/// Project `series` forward by `horizon` month-ends
pub fn drift_forecast(series: &MonthlySeries, horizon: usize) -> Forecast {
    let Some((mut date, last)) = series.last() else {
        return Forecast::default();
    };

    let changes = series.changes();
    let (drift, spread) = mean_and_std(&changes);

    let mut forecast = Forecast::default();
    for step in 1..=horizon {
        let h = step as f64;
        date = next_month_end(date);
        forecast.dates.push(date);
        forecast.mean.push(last + drift * h);
        forecast.lower.push(last + (drift - Z_95 * spread) * h);
        forecast.upper.push(last + (drift + Z_95 * spread) * h);
    }

    forecast
}

/// Mean and sample standard deviation, zero when undefined
fn mean_and_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance.sqrt())
}
