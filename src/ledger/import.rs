//! Bank Statement Preprocessing
//!
//! Turns raw `;`-separated bank exports found under `<data_dir>/raw` into
//! the processed `transactions.csv` the chart API reads. Every imported
//! file is recorded in `processed/register.json` so later runs only pick
//! up new exports.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::error::{LedgerError, LedgerResult};
use super::rules::RuleSet;
use super::types::{Ledger, Transaction, GENERAL_ACCOUNT, SAVINGS_ACCOUNT};

/// Date format used by the bank exports
const EXPORT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Maximum number of row errors kept in a report
const MAX_REPORTED_ERRORS: usize = 100;

/// When a raw export was imported
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterEntry {
    pub timestamp: String,
}

/// Imported file name -> import record
pub type Register = BTreeMap<String, RegisterEntry>;

/// Outcome of a preprocessing run
#[derive(Debug, Default)]
pub struct PreprocessReport {
    pub files: Vec<String>,
    pub transactions: usize,
    pub rows_failed: usize,
    pub errors: Vec<String>,
}

/// Column positions of a bank export
struct ExportColumns {
    sender: Option<usize>,
    recipient: Option<usize>,
    date: usize,
    amount: usize,
    balance: Option<usize>,
    description: usize,
}

impl ExportColumns {
    fn detect(headers: &csv::StringRecord, file: &Path) -> LedgerResult<Self> {
        let names: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |name: &str| names.iter().position(|n| n == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| LedgerError::Parse {
                file: file.to_path_buf(),
                message: format!("missing column '{}'", name),
            })
        };

        Ok(Self {
            sender: find("accountnumber"),
            recipient: find("counterparty_account_number"),
            date: require("date")?,
            amount: require("amount")?,
            balance: find("balance"),
            description: require("description")?,
        })
    }
}

/// Lower-case a header and replace spaces with underscores
fn normalize_header(header: &str) -> String {
    header
        .trim()
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .replace(' ', "_")
}

/// Parse a decimal that may use a comma separator
fn parse_decimal(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    value.replace(',', ".").parse().ok()
}

/// Imports raw bank exports into the processed transaction file
pub struct Preprocessor {
    data_dir: PathBuf,
    rules: RuleSet,
    /// Account number suffix -> sender label
    sender_suffixes: Vec<(String, String)>,
}

impl Preprocessor {
    /// Create a preprocessor rooted at `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>, rules: RuleSet) -> Self {
        Self {
            data_dir: data_dir.into(),
            rules,
            sender_suffixes: Vec::new(),
        }
    }

    /// Label senders whose account number ends with `suffix`
    pub fn with_account_suffix(mut self, suffix: &str, label: &str) -> Self {
        let suffix = suffix.trim();
        if !suffix.is_empty() {
            self.sender_suffixes
                .push((suffix.to_string(), label.to_string()));
        }
        self
    }

    /// Map the general and savings account suffixes, when configured
    pub fn with_accounts(self, general: Option<&str>, savings: Option<&str>) -> Self {
        let this = match general {
            Some(suffix) => self.with_account_suffix(suffix, GENERAL_ACCOUNT),
            None => self,
        };
        match savings {
            Some(suffix) => this.with_account_suffix(suffix, SAVINGS_ACCOUNT),
            None => this,
        }
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.data_dir.join("processed")
    }

    pub fn transactions_path(&self) -> PathBuf {
        self.processed_dir().join("transactions.csv")
    }

    pub fn register_path(&self) -> PathBuf {
        self.processed_dir().join("register.json")
    }

    /// Read the import register, empty when it does not exist yet
    pub fn read_register(&self) -> LedgerResult<Register> {
        let path = self.register_path();
        if !path.exists() {
            return Ok(Register::new());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Raw CSV exports that still need importing, sorted by name
    pub fn pending_files(&self, reprocess: bool) -> LedgerResult<(Vec<PathBuf>, Register)> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(self.raw_dir())? {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false);
            if path.is_file() && is_csv {
                files.push(path);
            }
        }
        files.sort();

        if reprocess || !self.register_path().exists() {
            return Ok((files, Register::new()));
        }

        let register = self.read_register()?;
        files.retain(|path| {
            file_name(path)
                .map(|name| !register.contains_key(&name))
                .unwrap_or(false)
        });
        Ok((files, register))
    }

    /// Parse one raw export into uncategorised transactions
    pub fn parse_export(&self, path: &Path, report: &mut PreprocessReport) -> LedgerResult<Vec<Transaction>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        let columns = ExportColumns::detect(&headers, path)?;
        let mut transactions = Vec::new();

        for (line_num, result) in reader.records().enumerate() {
            // Header is line 1
            let line = line_num + 2;
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    report.errors.push(format!("{}:{}: {}", path.display(), line, e));
                    report.rows_failed += 1;
                    continue;
                }
            };

            let field = |idx: usize| record.get(idx).unwrap_or("").trim();

            let date = match NaiveDate::parse_from_str(field(columns.date), EXPORT_DATE_FORMAT) {
                Ok(d) => d,
                Err(_) => {
                    report.errors.push(format!(
                        "{}:{}: invalid date '{}'",
                        path.display(),
                        line,
                        field(columns.date)
                    ));
                    report.rows_failed += 1;
                    continue;
                }
            };

            let amount = match parse_decimal(field(columns.amount)) {
                Some(a) => a,
                None => {
                    report.errors.push(format!(
                        "{}:{}: invalid amount '{}'",
                        path.display(),
                        line,
                        field(columns.amount)
                    ));
                    report.rows_failed += 1;
                    continue;
                }
            };

            let mut tx = Transaction::new(date, "", amount).description(field(columns.description));
            tx.sender = columns.sender.map(field).unwrap_or_default().to_string();
            tx.recipient = columns.recipient.map(field).unwrap_or_default().to_string();
            tx.balance = columns.balance.and_then(|idx| parse_decimal(field(idx)));
            transactions.push(tx);
        }

        Ok(transactions)
    }

    /// Replace known account numbers with their labels
    fn label_sender(&self, sender: &str) -> String {
        self.sender_suffixes
            .iter()
            .find(|(suffix, _)| sender.ends_with(suffix.as_str()))
            .map(|(_, label)| label.clone())
            .unwrap_or_else(|| sender.to_string())
    }

    /// Import pending exports into `processed/transactions.csv`
    ///
    /// With `reprocess` every raw export is imported again and the processed
    /// file and register are rewritten; otherwise new rows are appended.
    pub fn run(&self, reprocess: bool) -> LedgerResult<PreprocessReport> {
        let mut report = PreprocessReport::default();
        let (files, register) = self.pending_files(reprocess)?;

        if files.is_empty() {
            tracing::info!("No new files to process; exiting preprocessing");
            return Ok(report);
        }

        let mut transactions = Vec::new();
        for path in &files {
            let parsed = self.parse_export(path, &mut report)?;
            tracing::debug!(file = ?path, rows = parsed.len(), "Parsed bank export");
            transactions.extend(parsed);
        }

        transactions.sort_by_key(|tx| tx.date);
        self.rules.apply(&mut transactions);
        for tx in &mut transactions {
            tx.sender = self.label_sender(&tx.sender);
        }

        std::fs::create_dir_all(self.processed_dir())?;
        let out_path = self.transactions_path();

        let mut register = register;
        if reprocess {
            Ledger::write_all(&out_path, &transactions)?;
            register.clear();
        } else {
            let mut all = if out_path.exists() {
                Ledger::read_all(&out_path)?
            } else {
                Vec::new()
            };
            all.extend(transactions.iter().cloned());
            Ledger::write_all(&out_path, &all)?;
        }

        tracing::info!(
            transactions = transactions.len(),
            "Data preprocessing completed; updated transactions.csv"
        );

        let timestamp = Utc::now().to_rfc3339();
        for path in &files {
            if let Some(name) = file_name(path) {
                register.insert(name.clone(), RegisterEntry { timestamp: timestamp.clone() });
                report.files.push(name);
            }
        }
        std::fs::write(self.register_path(), serde_json::to_string_pretty(&register)?)?;

        if report.errors.len() > MAX_REPORTED_ERRORS {
            let total = report.errors.len();
            report.errors.truncate(MAX_REPORTED_ERRORS);
            report.errors.push(format!("... and {} more errors", total - MAX_REPORTED_ERRORS));
        }

        report.transactions = transactions.len();
        Ok(report)
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const EXPORT_JAN: &str = "Accountnumber;Heading;Date;Amount;Balance;Description;Counterparty account number;Currency;
BE00 1111 2222 3333;x;05/01/2026;-1200,00;1800,00;Despes rent january;BE77 0000;EUR;
BE00 1111 2222 3333;x;01/01/2026;3000,00;3000,00;ARHS salary;BE88 0000;EUR;
BE00 1111 2222 3333;x;99/99/2026;-5,00;;broken row;BE99 0000;EUR;
";

    const EXPORT_FEB: &str = "Accountnumber;Date;Amount;Balance;Description;Counterparty account number
BE00 9999 8888 4444;03/02/2026;250,00;250,00;Estalvis transfer;BE00 1111 2222 3333
";

    fn setup(files: &[(&str, &str)]) -> (tempfile::TempDir, Preprocessor) {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("raw")).unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join("raw").join(name), content).unwrap();
        }
        let pre = Preprocessor::new(dir.path(), RuleSet::default())
            .with_accounts(Some("3333"), Some("4444"));
        (dir, pre)
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Counterparty account number"), "counterparty_account_number");
        assert_eq!(normalize_header("\u{feff}Accountnumber"), "accountnumber");
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("-1200,50"), Some(-1200.5));
        assert_eq!(parse_decimal("42"), Some(42.0));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("abc"), None);
    }

    #[test]
    fn test_run_imports_and_categorises() {
        let (_dir, pre) = setup(&[("jan.csv", EXPORT_JAN), ("notes.txt", "ignored")]);

        let report = pre.run(false).unwrap();
        assert_eq!(report.files, vec!["jan.csv".to_string()]);
        assert_eq!(report.transactions, 2);
        assert_eq!(report.rows_failed, 1);

        let ledger = Ledger::load(&pre.transactions_path()).unwrap();
        let txs = ledger.transactions();
        assert_eq!(txs.len(), 2);
        // Sorted by date
        assert_eq!(txs[0].concept, "Salary");
        assert_eq!(txs[0].amount, 3000.0);
        assert_eq!(txs[1].concept, "Rent");
        assert_eq!(txs[1].balance, Some(1800.0));
        assert_eq!(txs[1].recipient, "BE77 0000");
        assert!(txs.iter().all(|tx| tx.sender == GENERAL_ACCOUNT));

        let register = pre.read_register().unwrap();
        assert!(register.contains_key("jan.csv"));
    }

    #[test]
    fn test_second_run_only_imports_new_files() {
        let (dir, pre) = setup(&[("jan.csv", EXPORT_JAN)]);
        pre.run(false).unwrap();

        let report = pre.run(false).unwrap();
        assert!(report.files.is_empty());

        std::fs::write(dir.path().join("raw").join("feb.csv"), EXPORT_FEB).unwrap();
        let report = pre.run(false).unwrap();
        assert_eq!(report.files, vec!["feb.csv".to_string()]);

        let all = Ledger::read_all(&pre.transactions_path()).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].sender, SAVINGS_ACCOUNT);
        assert_eq!(all[2].concept, "Savings");

        // Savings account rows are not part of the general ledger
        let ledger = Ledger::load(&pre.transactions_path()).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(pre.read_register().unwrap().len(), 2);
    }

    #[test]
    fn test_reprocess_rewrites_everything() {
        let (_dir, pre) = setup(&[("jan.csv", EXPORT_JAN), ("feb.csv", EXPORT_FEB)]);
        pre.run(false).unwrap();

        let report = pre.run(true).unwrap();
        assert_eq!(report.files.len(), 2);

        let all = Ledger::read_all(&pre.transactions_path()).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_missing_required_column() {
        let (_dir, pre) = setup(&[("bad.csv", "Accountnumber;Date;Description\nBE1;01/01/2026;x\n")]);
        let err = pre.run(false).unwrap_err();
        assert!(matches!(err, LedgerError::Parse { .. }));
        assert!(err.to_string().contains("amount"));
    }
}
