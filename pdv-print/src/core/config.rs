use std::path::PathBuf;

use chrono_tz::Tz;

use crate::printing::money::CurrencyLocale;

/// Print service configuration
///
/// # Environment variables
///
/// All settings can be overridden through environment variables:
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | ./data | Working directory (printer map, logs) |
/// | PRINTERS_FILE | {WORK_DIR}/printers.json | Role → printer map |
/// | PRINT_TIMEOUT_MS | 5000 | Wall-clock bound of one print attempt |
/// | PRINT_CLOSE_TIMEOUT_MS | 1000 | Bound of the best-effort close after a timeout |
/// | STORE_NAME | PDV | Title printed on sale receipts |
/// | TIMEZONE | America/Sao_Paulo | Timezone of the footer timestamp |
/// | CURRENCY_LOCALE | legacy | `legacy` (R$ 10.00) or `pt-BR` (R$ 10,00) |
/// | LOG_LEVEL | info | tracing max level |
/// | LOG_DIR | (unset) | Daily rolling log files when set |
///
/// # Example
///
/// ```ignore
/// PRINT_TIMEOUT_MS=8000 STORE_NAME="Cantina da Nona" pdv-print status
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory
    pub work_dir: String,
    /// Printer map location, overrides `{work_dir}/printers.json`
    pub printers_file: Option<String>,
    /// Timeout of one print attempt (milliseconds)
    pub print_timeout_ms: u64,
    /// Timeout of the close attempted after a print timeout (milliseconds)
    pub close_timeout_ms: u64,
    /// Store / brand name printed on receipts
    pub store_name: String,
    /// Timezone of printed timestamps
    pub timezone: Tz,
    /// Monetary format
    pub currency_locale: CurrencyLocale,
    /// Log level
    pub log_level: String,
    /// Log directory
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to their defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            printers_file: std::env::var("PRINTERS_FILE").ok(),
            print_timeout_ms: std::env::var("PRINT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            close_timeout_ms: std::env::var("PRINT_CLOSE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            store_name: std::env::var("STORE_NAME").unwrap_or_else(|_| "PDV".into()),
            timezone: std::env::var("TIMEZONE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(chrono_tz::America::Sao_Paulo),
            currency_locale: std::env::var("CURRENCY_LOCALE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// Location of the role → printer map
    pub fn printers_path(&self) -> PathBuf {
        match &self.printers_file {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(&self.work_dir).join("printers.json"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: "./data".into(),
            printers_file: None,
            print_timeout_ms: 5000,
            close_timeout_ms: 1000,
            store_name: "PDV".into(),
            timezone: chrono_tz::America::Sao_Paulo,
            currency_locale: CurrencyLocale::default(),
            log_level: "info".into(),
            log_dir: None,
        }
    }
}
