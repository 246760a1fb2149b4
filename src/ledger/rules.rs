//! Categorisation Rules
//!
//! Assigns a concept and an "essential" flag to each transaction from
//! keywords found in its description, and flags recurring payments.

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use super::error::{LedgerError, LedgerResult};
use super::types::Transaction;

/// Concept given to transactions no rule matched
pub const DEFAULT_CONCEPT: &str = "Others";

/// Description prefix banks use for direct debits
const DIRECT_DEBIT_PREFIX: &str = "european direct debit creditor";

/// Day gap between two payments to the same recipient that counts as monthly
const RECURRING_MIN_DAYS: i64 = 27;
const RECURRING_MAX_DAYS: i64 = 33;

/// A keyword rule mapping descriptions to a concept
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CategoryRule {
    pub concept: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub is_essential: bool,
}

impl CategoryRule {
    pub fn new(concept: &str, keywords: &[&str], is_essential: bool) -> Self {
        Self {
            concept: concept.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            is_essential,
        }
    }
}

/// Rules shipped with the application
pub fn default_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new("Salary", &["arhs"], true),
        CategoryRule::new("Rent", &["despes"], true),
        CategoryRule::new(
            "Groceries",
            &["delhaize", "carrefour", "crf exp", "finest globe belliard"],
            true,
        ),
        CategoryRule::new("Insurance", &["fmsb-fsmb"], true),
        CategoryRule::new("Savings", &["estalvis"], true),
        CategoryRule::new(
            "Grooming",
            &["sportoase", "xxl nutrition", "apotheek", "knapper"],
            true,
        ),
        CategoryRule::new("Transport", &["stib", "sncb", "nmbs", "bahn"], true),
        CategoryRule::new("Cantine", &["cantine"], false),
        CategoryRule::new("Subscriptions", &["kbc plus"], false),
    ]
}

/// Compiled, ordered rule set. Later rules win over earlier ones.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<(CategoryRule, Regex)>,
}

impl RuleSet {
    /// Compile rules into case-insensitive matchers
    ///
    /// Rules without keywords are kept out of the set, they would otherwise
    /// match every description.
    pub fn new(rules: Vec<CategoryRule>) -> LedgerResult<Self> {
        let mut compiled = Vec::with_capacity(rules.len());

        for rule in rules {
            let keywords: Vec<String> = rule
                .keywords
                .iter()
                .map(|k| k.trim())
                .filter(|k| !k.is_empty())
                .map(regex::escape)
                .collect();

            if keywords.is_empty() {
                tracing::warn!(concept = %rule.concept, "Skipping rule without keywords");
                continue;
            }

            let regex = RegexBuilder::new(&keywords.join("|"))
                .case_insensitive(true)
                .build()
                .map_err(|e| LedgerError::InvalidRule {
                    concept: rule.concept.clone(),
                    message: e.to_string(),
                })?;

            compiled.push((rule, regex));
        }

        Ok(Self { rules: compiled })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Set concept, essential and recurring flags on every transaction
    pub fn apply(&self, transactions: &mut [Transaction]) {
        let recurring = flag_recurring(transactions);

        for (tx, is_recurring) in transactions.iter_mut().zip(recurring) {
            tx.is_recurring = is_recurring;
            tx.concept = DEFAULT_CONCEPT.to_string();
            tx.is_essential = false;

            for (rule, regex) in &self.rules {
                if regex.is_match(&tx.description) {
                    tx.concept = rule.concept.clone();
                    tx.is_essential = rule.is_essential;
                }
            }
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        // The built-in keywords are plain words, escaping keeps them valid
        Self::new(default_rules()).unwrap_or(Self { rules: Vec::new() })
    }
}

/// Flag direct debits and payments repeating roughly monthly to one recipient
///
/// Returns one flag per transaction, in input order.
pub fn flag_recurring(transactions: &[Transaction]) -> Vec<bool> {
    let mut flags: Vec<bool> = transactions
        .iter()
        .map(|tx| tx.description.to_lowercase().starts_with(DIRECT_DEBIT_PREFIX))
        .collect();

    let mut order: Vec<usize> = (0..transactions.len())
        .filter(|&i| !transactions[i].recipient.is_empty())
        .collect();
    order.sort_by(|&a, &b| {
        let (ta, tb) = (&transactions[a], &transactions[b]);
        ta.recipient.cmp(&tb.recipient).then(ta.date.cmp(&tb.date))
    });

    for pair in order.windows(2) {
        let (prev, curr) = (&transactions[pair[0]], &transactions[pair[1]]);
        if prev.recipient != curr.recipient {
            continue;
        }
        let gap = (curr.date - prev.date).num_days();
        if (RECURRING_MIN_DAYS..=RECURRING_MAX_DAYS).contains(&gap) {
            flags[pair[1]] = true;
        }
    }

    flags
}
