//! Pie Figure
//!
//! Share of each expense concept in total spending.

use serde_json::json;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::ChartPayload;
use crate::ledger::Ledger;

pub fn pie_chart(ledger: &Ledger) -> ChartPayload {
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for tx in ledger.expenses() {
        *sums.entry(tx.concept.as_str()).or_default() += tx.amount;
    }

    let mut categories: Vec<(&str, f64)> = sums
        .into_iter()
        .map(|(concept, total)| (concept, total.abs()))
        .collect();
    categories.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let (labels, values): (Vec<&str>, Vec<f64>) = categories.into_iter().unzip();

    let trace = json!({
        "type": "pie",
        "labels": labels,
        "values": values,
        "hole": 0.5,
        "textinfo": "percent+label",
        "direction": "clockwise",
        "textposition": "inside",
    });

    let layout = json!({
        "title": { "text": "Pie Chart of Expenses Distribution" },
        "width": 800,
        "height": 800,
        "showlegend": true,
    });

    ChartPayload::new(vec![trace], layout)
}
