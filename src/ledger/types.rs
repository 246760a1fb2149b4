//! Core ledger types
//!
//! - `Transaction`: one booked movement on an account
//! - `Ledger`: the set of transactions the charts are built from

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::LedgerResult;

/// Sender label given to the main current account
pub const GENERAL_ACCOUNT: &str = "General";

/// Sender label given to the savings account
pub const SAVINGS_ACCOUNT: &str = "Savings";

/// A single booked transaction
///
/// Amounts are signed: income is positive, spending is negative.
/// The same shape is used for rows of the processed `transactions.csv`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    /// Account balance after the transaction, when the bank reports it
    #[serde(default)]
    pub balance: Option<f64>,
    pub concept: String,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub is_essential: bool,
}

impl Transaction {
    /// Create a transaction on the general account with only a concept and amount
    pub fn new(date: NaiveDate, concept: impl Into<String>, amount: f64) -> Self {
        let concept = concept.into();
        Self {
            date,
            sender: GENERAL_ACCOUNT.to_string(),
            recipient: String::new(),
            description: concept.clone(),
            amount,
            balance: None,
            concept,
            is_recurring: false,
            is_essential: false,
        }
    }

    /// Builder method: set the reported balance
    pub fn balance(mut self, balance: f64) -> Self {
        self.balance = Some(balance);
        self
    }

    /// Builder method: set the recipient account
    pub fn recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = recipient.into();
        self
    }

    /// Builder method: set the free-text description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }
}

/// An ordered collection of transactions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    /// Built-in demo ledger, used when no processed data exists
    pub fn sample() -> Self {
        let rows = [
            ("Salary", 5000.0, (2026, 1, 1)),
            ("Investment", 2000.0, (2026, 1, 15)),
            ("Rent", -1500.0, (2026, 2, 1)),
            ("Groceries", -800.0, (2026, 2, 15)),
            ("Utilities", -300.0, (2026, 3, 1)),
        ];

        let transactions = rows
            .into_iter()
            .filter_map(|(concept, amount, (y, m, d))| {
                NaiveDate::from_ymd_opt(y, m, d).map(|date| Transaction::new(date, concept, amount))
            })
            .collect();

        Self { transactions }
    }

    /// Load the processed transactions file, keeping general-account rows only
    pub fn load(path: &Path) -> LedgerResult<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut transactions = Vec::new();

        for row in reader.deserialize::<Transaction>() {
            let tx = row?;
            if tx.sender == GENERAL_ACCOUNT {
                transactions.push(tx);
            }
        }

        tracing::debug!(count = transactions.len(), path = ?path, "Loaded ledger");
        Ok(Self { transactions })
    }

    /// Read every row of a processed file, regardless of sender
    pub fn read_all(path: &Path) -> LedgerResult<Vec<Transaction>> {
        let mut reader = csv::Reader::from_path(path)?;
        reader
            .deserialize::<Transaction>()
            .map(|row| row.map_err(Into::into))
            .collect()
    }

    /// Write transactions as a processed CSV file
    pub fn write_all(path: &Path, transactions: &[Transaction]) -> LedgerResult<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for tx in transactions {
            writer.serialize(tx)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn income(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|tx| tx.is_income())
    }

    pub fn expenses(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|tx| tx.is_expense())
    }
}
