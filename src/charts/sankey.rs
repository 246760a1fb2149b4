//! Sankey Figure
//!
//! Three layers of nodes:
//!
//! ```text
//! income concepts ──▶ Savings / Expenses / Balance ──▶ expense concepts
//! ```
//!
//! Each income is split between Savings and Expenses in proportion to the
//! total outflow going to each; whatever is not allocated flows to Balance.

use serde_json::json;
use std::collections::{BTreeMap, HashMap};

use super::ChartPayload;
use crate::ledger::Ledger;

const SAVINGS: &str = "Savings";
const EXPENSES: &str = "Expenses";
const BALANCE: &str = "Balance";

/// Node labels, deduplicated, in insertion order
#[derive(Default)]
struct Nodes {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl Nodes {
    fn id(&mut self, label: &str) -> usize {
        if let Some(&idx) = self.index.get(label) {
            return idx;
        }
        let idx = self.labels.len();
        self.labels.push(label.to_string());
        self.index.insert(label.to_string(), idx);
        idx
    }
}

#[derive(Default)]
struct Links {
    source: Vec<usize>,
    target: Vec<usize>,
    value: Vec<f64>,
    color: Vec<&'static str>,
}

impl Links {
    fn push(&mut self, source: usize, target: usize, value: f64, color: &'static str) {
        self.source.push(source);
        self.target.push(target);
        self.value.push(value);
        self.color.push(color);
    }
}

pub fn sankey_chart(ledger: &Ledger) -> ChartPayload {
    let mut inflows: BTreeMap<&str, f64> = BTreeMap::new();
    for tx in ledger.income() {
        *inflows.entry(tx.concept.as_str()).or_default() += tx.amount;
    }

    let outflows: Vec<(&str, f64)> = ledger
        .expenses()
        .map(|tx| (tx.concept.as_str(), -tx.amount))
        .collect();

    let mut nodes = Nodes::default();
    for concept in inflows.keys() {
        nodes.id(concept);
    }
    let savings = nodes.id(SAVINGS);
    let expenses = nodes.id(EXPENSES);
    let balance = nodes.id(BALANCE);
    for (concept, _) in outflows.iter().filter(|(c, _)| *c != SAVINGS) {
        nodes.id(concept);
    }

    let total_savings: f64 = outflows
        .iter()
        .filter(|(c, _)| *c == SAVINGS)
        .map(|(_, a)| a)
        .sum();
    let total_expenses: f64 = outflows
        .iter()
        .filter(|(c, _)| *c != SAVINGS)
        .map(|(_, a)| a)
        .sum();
    let total_out = total_savings + total_expenses;

    let mut links = Links::default();

    for (concept, &income) in &inflows {
        let (to_savings, to_expenses) = if total_out > 0.0 {
            (
                income * total_savings / total_out,
                income * total_expenses / total_out,
            )
        } else {
            (0.0, 0.0)
        };
        let to_balance = (income - to_savings - to_expenses).max(0.0);
        let source = nodes.id(concept);

        if to_savings > 0.0 {
            links.push(source, savings, to_savings, "green");
        }
        if to_expenses > 0.0 {
            links.push(source, expenses, to_expenses, "blue");
        }
        if to_balance > 0.0 {
            links.push(source, balance, to_balance, "gray");
        }
    }

    for (concept, amount) in outflows.iter().filter(|(c, _)| *c != SAVINGS) {
        let target = nodes.id(concept);
        links.push(expenses, target, *amount, "red");
    }

    let trace = json!({
        "type": "sankey",
        "node": {
            "pad": 15,
            "thickness": 20,
            "line": { "color": "black", "width": 0.5 },
            "label": nodes.labels,
            "color": "lightblue",
        },
        "link": {
            "source": links.source,
            "target": links.target,
            "value": links.value,
            "color": links.color,
        },
    });

    let layout = json!({
        "title": { "text": "Sankey Diagram Breakdown" },
        "font": { "size": 10 },
    });

    ChartPayload::new(vec![trace], layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Transaction;
    use chrono::NaiveDate;
    use serde_json::Value;

    fn tx(concept: &str, amount: f64) -> Transaction {
        Transaction::new(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), concept, amount)
    }

    fn as_f64s(value: &Value) -> Vec<f64> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_f64().unwrap())
            .collect()
    }

    #[test]
    fn test_sample_sankey() {
        let payload = sankey_chart(&Ledger::sample());
        let trace = &payload.data[0];

        assert_eq!(trace["type"], "sankey");
        assert_eq!(
            trace["node"]["label"],
            json!(["Investment", "Salary", "Savings", "Expenses", "Balance", "Rent", "Groceries", "Utilities"])
        );
        // Investment and Salary both flow fully into Expenses
        assert_eq!(trace["link"]["source"], json!([0, 1, 3, 3, 3]));
        assert_eq!(trace["link"]["target"], json!([3, 3, 5, 6, 7]));
        assert_eq!(
            as_f64s(&trace["link"]["value"]),
            vec![2000.0, 5000.0, 1500.0, 800.0, 300.0]
        );
        assert_eq!(
            trace["link"]["color"],
            json!(["blue", "blue", "red", "red", "red"])
        );
        assert_eq!(payload.layout["title"]["text"], "Sankey Diagram Breakdown");
        assert_eq!(payload.layout["font"]["size"], 10);
    }

    #[test]
    fn test_income_split_between_savings_and_expenses() {
        let ledger = Ledger::from_transactions(vec![
            tx("Salary", 1000.0),
            tx("Savings", -250.0),
            tx("Rent", -750.0),
        ]);
        let payload = sankey_chart(&ledger);
        let link = &payload.data[0]["link"];

        // Salary -> Savings 250, Salary -> Expenses 750, Expenses -> Rent 750
        assert_eq!(as_f64s(&link["value"]), vec![250.0, 750.0, 750.0]);
        assert_eq!(link["color"], json!(["green", "blue", "red"]));
        // Savings is never a detailed expense node
        assert_eq!(
            payload.data[0]["node"]["label"],
            json!(["Salary", "Savings", "Expenses", "Balance", "Rent"])
        );
    }

    #[test]
    fn test_no_outflows_goes_to_balance() {
        let ledger = Ledger::from_transactions(vec![tx("Salary", 1000.0), tx("Salary", 500.0)]);
        let link = &sankey_chart(&ledger).data[0]["link"];

        assert_eq!(as_f64s(&link["value"]), vec![1500.0]);
        assert_eq!(link["color"], json!(["gray"]));
    }

    #[test]
    fn test_each_expense_row_is_its_own_link() {
        let ledger = Ledger::from_transactions(vec![
            tx("Salary", 1000.0),
            tx("Groceries", -40.0),
            tx("Groceries", -60.0),
        ]);
        let link = &sankey_chart(&ledger).data[0]["link"];
        // All income is routed to Expenses, then split per expense row
        assert_eq!(as_f64s(&link["value"]), vec![1000.0, 40.0, 60.0]);
    }
}
