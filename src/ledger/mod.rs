//! Finboard Ledger
//!
//! Transaction data behind the dashboard charts:
//!
//! - **types**: `Transaction` and `Ledger`
//! - **rules**: keyword categorisation and recurring-payment detection
//! - **import**: raw bank export preprocessing
//! - **error**: Error types
//!
//! # Data Flow
//!
//! ```text
//! raw/*.csv → Preprocessor (parse, sort, categorise, label accounts)
//!           → processed/transactions.csv + processed/register.json
//!           → Ledger::load (general account only) → charts
//! ```

pub mod error;
pub mod import;
pub mod rules;
pub mod types;

pub use error::{LedgerError, LedgerResult};
pub use import::{PreprocessReport, Preprocessor, Register, RegisterEntry};
pub use rules::{default_rules, flag_recurring, CategoryRule, RuleSet, DEFAULT_CONCEPT};
pub use types::{Ledger, Transaction, GENERAL_ACCOUNT, SAVINGS_ACCOUNT};
