//! Print manager
//!
//! Entry point for business code. Normalizes loosely shaped JSON objects,
//! delegates to the dispatcher and turns every failure into a
//! context-prefixed [`ManagerError`]. A failed print never aborts the
//! caller's already committed transaction; it only reports.

use std::fmt;
use std::sync::Arc;

use pdv_printer::PrintError;
use serde::Serialize;
use serde_json::Value;
use shared::models::{PrinterConfig, PrinterRole};
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::dispatcher::{DispatchError, PrintDispatcher};
use super::normalize;

const CTX_KITCHEN: &str = "Falha na impressão da cozinha";
const CTX_SALE: &str = "Falha na impressão do cupom";
const CTX_DELIVERY: &str = "Falha na impressão do delivery";
const CTX_TABLE: &str = "Falha na impressão da mesa";
const CTX_TEXT: &str = "Falha na impressão de texto";
const CTX_TEST_PAGE: &str = "Falha no teste de impressão";

/// Failure category callers can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Timeout,
    Connection,
    Configuration,
    Formatting,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Connection => write!(f, "connection"),
            FailureKind::Configuration => write!(f, "configuration"),
            FailureKind::Formatting => write!(f, "formatting"),
        }
    }
}

/// Print failure as reported to business code
#[derive(Debug, Clone, Error)]
#[error("{context}: {detail}")]
pub struct ManagerError {
    pub context: &'static str,
    pub kind: FailureKind,
    pub detail: String,
}

impl ManagerError {
    fn new(context: &'static str, err: DispatchError) -> Self {
        let (kind, detail) = match &err {
            DispatchError::NoPrinter(role) => (
                FailureKind::Configuration,
                format!("erro ao conectar: nenhuma impressora configurada para {}", role),
            ),
            DispatchError::Print(e) => match e {
                PrintError::Timeout(msg) => (
                    FailureKind::Timeout,
                    format!("impressora não respondeu, impressão demorou muito (timeout: {})", msg),
                ),
                PrintError::Connection(msg) => (
                    FailureKind::Connection,
                    format!("erro ao conectar: impressora não encontrada ({})", msg),
                ),
                PrintError::Io(io) => (
                    FailureKind::Connection,
                    format!("erro ao conectar: comunicação interrompida ({})", io),
                ),
                PrintError::Configuration(msg) => (
                    FailureKind::Configuration,
                    format!("erro ao conectar: configuração inválida ({})", msg),
                ),
                PrintError::Formatting(msg) => (
                    FailureKind::Formatting,
                    format!("falha ao formatar ({})", msg),
                ),
            },
        };
        Self {
            context,
            kind,
            detail,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == FailureKind::Timeout
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;

/// Aggregated availability for the settings screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrinterStatus {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Print manager
#[derive(Clone)]
pub struct PrintManager {
    dispatcher: Arc<PrintDispatcher>,
}

impl PrintManager {
    pub fn new(dispatcher: Arc<PrintDispatcher>) -> Self {
        Self { dispatcher }
    }

    #[instrument(skip_all)]
    pub async fn print_for_kitchen(&self, order: &Value) -> ManagerResult<String> {
        let order = normalize::kitchen_order(order);
        info!(order_id = %order.order_id, order_type = %order.order_type, items = order.items.len(), "Kitchen order");
        let result = self.dispatcher.print_kitchen_order(order).await;
        translate(CTX_KITCHEN, result)
    }

    #[instrument(skip_all)]
    pub async fn print_sale_receipt(&self, sale: &Value) -> ManagerResult<String> {
        let receipt = normalize::sale_receipt(sale);
        info!(sale_id = %receipt.sale_id, items = receipt.items.len(), "Sale receipt");
        let result = self.dispatcher.print_sale_receipt(receipt).await;
        translate(CTX_SALE, result)
    }

    #[instrument(skip_all)]
    pub async fn print_delivery_order(&self, delivery: &Value) -> ManagerResult<String> {
        let order = normalize::delivery_order(delivery);
        info!(order_id = %order.order_id, items = order.items.len(), "Delivery order");
        let result = self.dispatcher.print_delivery_order(order).await;
        translate(CTX_DELIVERY, result)
    }

    #[instrument(skip_all)]
    pub async fn print_table_order(&self, table: &Value) -> ManagerResult<String> {
        let order = normalize::table_order(table);
        info!(table = %order.table_number, items = order.items.len(), "Table order");
        let result = self.dispatcher.print_table_order(order).await;
        translate(CTX_TABLE, result)
    }

    /// Print raw text, one printed line per input line
    #[instrument(skip(self, text))]
    pub async fn print_simple_text(&self, text: &str, role: PrinterRole) -> ManagerResult<String> {
        let result = self.dispatcher.print_text(role, text_lines(text)).await;
        translate(CTX_TEXT, result)
    }

    #[instrument(skip(self))]
    pub async fn print_test_page(&self, role: PrinterRole) -> ManagerResult<String> {
        let result = self.dispatcher.print_test_page(role).await;
        translate(CTX_TEST_PAGE, result)
    }

    pub fn printer_for(&self, role: PrinterRole) -> Option<PrinterConfig> {
        self.dispatcher.printer_for(role)
    }

    /// Probe the configured printers. Never fails.
    pub async fn check_printers_status(&self) -> PrinterStatus {
        let probes = self.dispatcher.check_printer_service_status().await;
        if probes.is_empty() {
            return PrinterStatus {
                available: false,
                error: Some("Nenhuma impressora configurada".to_string()),
            };
        }

        let failures: Vec<String> = probes
            .iter()
            .filter(|p| !p.online)
            .map(|p| {
                format!(
                    "{} ({}): {}",
                    p.role,
                    p.printer,
                    p.error.as_deref().unwrap_or("indisponível")
                )
            })
            .collect();

        if failures.is_empty() {
            PrinterStatus {
                available: true,
                error: None,
            }
        } else {
            PrinterStatus {
                available: false,
                error: Some(failures.join("; ")),
            }
        }
    }
}

fn translate(context: &'static str, result: Result<String, DispatchError>) -> ManagerResult<String> {
    result.map_err(|e| {
        let err = ManagerError::new(context, e);
        warn!(kind = %err.kind, error = %err, "Print failed");
        err
    })
}

/// Split on newlines; blank lines print as a single space
fn text_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .map(|line| {
            if line.trim().is_empty() {
                " ".to_string()
            } else {
                line.to_string()
            }
        })
        .collect()
}
