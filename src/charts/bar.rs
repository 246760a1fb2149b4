//! Bar Figure
//!
//! Net amount per calendar month, coloured by sign.

use chrono::{Datelike, NaiveDate};
use serde_json::json;
use std::collections::BTreeMap;

use super::{ChartPayload, Palette};
use crate::ledger::Ledger;

pub fn bar_chart(ledger: &Ledger, palette: &Palette) -> ChartPayload {
    // (year, month) keys keep the months in chronological order
    let mut monthly: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for tx in ledger.transactions() {
        *monthly.entry((tx.date.year(), tx.date.month())).or_default() += tx.amount;
    }

    let mut labels = Vec::with_capacity(monthly.len());
    let mut totals = Vec::with_capacity(monthly.len());
    let mut colors = Vec::with_capacity(monthly.len());

    for ((year, month), total) in monthly {
        let label = NaiveDate::from_ymd_opt(year, month, 1)
            .map(|d| d.format("%b %Y").to_string())
            .unwrap_or_else(|| format!("{:02}/{}", month, year));
        labels.push(label);
        totals.push(total);
        let color = if total >= 0.0 {
            palette.positive
        } else {
            palette.negative
        };
        colors.push(color.to_string());
    }

    let trace = json!({
        "type": "bar",
        "x": labels,
        "y": totals,
        "marker": { "color": colors },
    });

    let layout = json!({
        "title": { "text": "Monthly Financial Overview" },
        "xaxis": { "title": { "text": "Month" } },
        "yaxis": { "title": { "text": "Total amount" } },
    });

    ChartPayload::new(vec![trace], layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Transaction;

    #[test]
    fn test_sample_bar() {
        let payload = bar_chart(&Ledger::sample(), &Palette::default());
        let trace = &payload.data[0];

        assert_eq!(trace["x"], json!(["Jan 2026", "Feb 2026", "Mar 2026"]));
        assert_eq!(trace["y"], json!([7000.0, -2300.0, -300.0]));
        assert_eq!(
            trace["marker"]["color"],
            json!(["#5AA800", "#AF0000", "#AF0000"])
        );
        assert_eq!(payload.layout["xaxis"]["title"]["text"], "Month");
    }

    #[test]
    fn test_months_sorted_across_years() {
        let ledger = Ledger::from_transactions(vec![
            Transaction::new(NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(), "Rent", -10.0),
            Transaction::new(NaiveDate::from_ymd_opt(2025, 12, 3).unwrap(), "Salary", 10.0),
            Transaction::new(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(), "Salary", 0.0),
        ]);
        let trace = &bar_chart(&ledger, &Palette::default()).data[0];

        assert_eq!(trace["x"], json!(["Feb 2025", "Dec 2025", "Jan 2026"]));
        // Zero counts as non-negative
        assert_eq!(trace["marker"]["color"][0], "#5AA800");
    }
}
