//! Print dispatcher
//!
//! Owns the role → printer map and runs each job as a single attempt:
//! resolve printer, validate, open a fresh session, render, close.
//! Sessions are never pooled or shared between jobs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use parking_lot::RwLock;
use pdv_printer::{Connector, DeviceConnector, Endpoint, PrintError, PrintResult};
use shared::models::{
    ConnectionType, DEFAULT_BAUD_RATE, DEFAULT_NETWORK_PORT, DeliveryOrder, KitchenOrder,
    PrintJob, PrinterConfig, PrinterRole, SaleReceipt, TableOrder, parse_hex_id,
};
use thiserror::Error;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{error, info, instrument, warn};

use super::renderer::JobRenderer;
use crate::core::Config;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("No printer configured for role: {0}")]
    NoPrinter(PrinterRole),

    #[error(transparent)]
    Print(#[from] PrintError),
}

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Result of probing one configured printer
#[derive(Debug, Clone, PartialEq)]
pub struct PrinterProbe {
    pub role: PrinterRole,
    pub printer: String,
    pub online: bool,
    pub error: Option<String>,
}

/// Print dispatcher
pub struct PrintDispatcher {
    connector: Arc<dyn Connector>,
    renderer: JobRenderer,
    printers: RwLock<HashMap<PrinterRole, PrinterConfig>>,
    timeout: Duration,
    close_timeout: Duration,
}

impl PrintDispatcher {
    /// Dispatcher backed by the real device transports
    pub fn new(config: &Config) -> Self {
        Self::with_connector(config, Arc::new(DeviceConnector::new()))
    }

    pub fn with_connector(config: &Config, connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            renderer: JobRenderer::new(
                config.store_name.clone(),
                config.timezone,
                config.currency_locale,
            ),
            printers: RwLock::new(HashMap::new()),
            timeout: Duration::from_millis(config.print_timeout_ms),
            close_timeout: Duration::from_millis(config.close_timeout_ms),
        }
    }

    // ========== Printer map ==========

    /// Assign a printer to a role, replacing any previous one
    pub fn set_printer(&self, role: PrinterRole, printer: PrinterConfig) {
        info!(%role, printer = %printer.display_name(), "Printer assigned");
        self.printers.write().insert(role, printer);
    }

    pub fn remove_printer(&self, role: PrinterRole) -> Option<PrinterConfig> {
        let removed = self.printers.write().remove(&role);
        if removed.is_some() {
            info!(%role, "Printer removed");
        }
        removed
    }

    /// Replace the whole map
    pub fn load_printers(&self, printers: HashMap<PrinterRole, PrinterConfig>) {
        info!(count = printers.len(), "Printer map loaded");
        *self.printers.write() = printers;
    }

    /// Snapshot of the configured map
    pub fn printers(&self) -> HashMap<PrinterRole, PrinterConfig> {
        self.printers.read().clone()
    }

    /// Printer serving `role`, following the role fallback
    pub fn printer_for(&self, role: PrinterRole) -> Option<PrinterConfig> {
        let printers = self.printers.read();
        printers
            .get(&role)
            .or_else(|| role.fallback().and_then(|r| printers.get(&r)))
            .cloned()
    }

    // ========== Jobs ==========

    pub async fn print_kitchen_order(&self, order: KitchenOrder) -> DispatchResult<String> {
        self.execute(PrinterRole::Kitchen, PrintJob::Kitchen(order)).await
    }

    pub async fn print_sale_receipt(&self, receipt: SaleReceipt) -> DispatchResult<String> {
        self.execute(PrinterRole::Receipt, PrintJob::Sale(receipt)).await
    }

    pub async fn print_delivery_order(&self, order: DeliveryOrder) -> DispatchResult<String> {
        self.execute(PrinterRole::Kitchen, PrintJob::Delivery(order)).await
    }

    pub async fn print_table_order(&self, order: TableOrder) -> DispatchResult<String> {
        self.execute(PrinterRole::Table, PrintJob::Table(order)).await
    }

    pub async fn print_text(&self, role: PrinterRole, lines: Vec<String>) -> DispatchResult<String> {
        self.execute(role, PrintJob::Text(lines)).await
    }

    pub async fn print_test_page(&self, role: PrinterRole) -> DispatchResult<String> {
        let printer = self.printer_for(role).ok_or(DispatchError::NoPrinter(role))?;
        let job = PrintJob::TestPage {
            printer_name: printer.display_name(),
        };
        self.execute(role, job).await
    }

    /// Run one job as a single bounded attempt
    #[instrument(skip(self, job), fields(job = job.label()))]
    async fn execute(&self, role: PrinterRole, job: PrintJob) -> DispatchResult<String> {
        let printer = self.printer_for(role).ok_or(DispatchError::NoPrinter(role))?;
        let endpoint = endpoint_for(&printer)?;
        let name = printer.display_name();
        let limit = printer
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(self.timeout);

        // Open and render share one deadline
        let deadline = Instant::now() + limit;

        info!(printer = %name, %endpoint, "Opening printer session");
        let mut session = match timeout_at(deadline, self.connector.open(&endpoint, limit)).await {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => {
                error!(printer = %name, error = %e, "Failed to open printer");
                return Err(e.into());
            }
            Err(_) => {
                error!(printer = %name, "Opening printer timed out");
                return Err(timeout_error(&endpoint, limit).into());
            }
        };

        let rendered = timeout_at(
            deadline,
            self.renderer.render(&job, printer.paper_width, &mut *session),
        )
        .await;

        // Close runs once whatever the render outcome
        match timeout(self.close_timeout, session.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(printer = %name, error = %e, "Failed to close printer session"),
            Err(_) => warn!(printer = %name, "Closing printer session timed out"),
        }

        match rendered {
            Ok(Ok(())) => {
                info!(printer = %name, "Print job sent");
                Ok(format!("{} impresso em {}", capitalize(job.label()), name))
            }
            Ok(Err(e)) => {
                error!(printer = %name, error = %e, "Print failed");
                Err(render_error(e).into())
            }
            Err(_) => {
                error!(printer = %name, "Print timed out");
                Err(timeout_error(&endpoint, limit).into())
            }
        }
    }

    // ========== Status ==========

    /// Probe every configured printer without printing
    pub async fn check_printer_service_status(&self) -> Vec<PrinterProbe> {
        let mut printers: Vec<_> = self.printers().into_iter().collect();
        printers.sort_by_key(|(role, _)| PrinterRole::ALL.iter().position(|r| r == role));

        let probes = printers.into_iter().map(|(role, printer)| async move {
            let result = self.probe(&printer).await;
            if let Err(e) = &result {
                warn!(%role, printer = %printer.display_name(), error = %e, "Printer probe failed");
            }
            PrinterProbe {
                role,
                printer: printer.display_name(),
                online: result.is_ok(),
                error: result.err().map(|e| e.to_string()),
            }
        });
        join_all(probes).await
    }

    async fn probe(&self, printer: &PrinterConfig) -> PrintResult<()> {
        let endpoint = endpoint_for(printer)?;
        let limit = printer
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(self.timeout);
        timeout(limit, self.connector.probe(&endpoint))
            .await
            .map_err(|_| timeout_error(&endpoint, limit))?
    }
}

/// Adapter failures after the session is open are formatting failures
fn render_error(err: PrintError) -> PrintError {
    match err {
        PrintError::Timeout(_) | PrintError::Formatting(_) => err,
        other => PrintError::Formatting(other.to_string()),
    }
}

fn timeout_error(endpoint: &Endpoint, limit: Duration) -> PrintError {
    PrintError::Timeout(format!(
        "{} did not respond within {} ms",
        endpoint,
        limit.as_millis()
    ))
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Validate a printer configuration into a transport endpoint
///
/// Exactly the field group selected by `connection_type` may be populated.
pub fn endpoint_for(printer: &PrinterConfig) -> PrintResult<Endpoint> {
    let kind = printer.connection_type;
    let foreign: Vec<String> = printer
        .populated_groups()
        .into_iter()
        .filter(|group| *group != kind)
        .map(|group| group.to_string())
        .collect();
    if !foreign.is_empty() {
        return Err(PrintError::Configuration(format!(
            "{} printer also has {} settings",
            kind,
            foreign.join(", ")
        )));
    }

    match kind {
        ConnectionType::Usb => {
            let vendor_id = hex_field(printer.vendor_id.as_deref(), "vendorId")?;
            let product_id = hex_field(printer.product_id.as_deref(), "productId")?;
            Ok(Endpoint::Usb {
                vendor_id,
                product_id,
            })
        }
        ConnectionType::Network => {
            let host = printer
                .ip
                .as_deref()
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
                .ok_or_else(|| PrintError::Configuration("Network printer without ip".into()))?;
            let port = printer.port.unwrap_or(DEFAULT_NETWORK_PORT);
            if port == 0 {
                return Err(PrintError::Configuration(format!("Invalid port for {}", host)));
            }
            Ok(Endpoint::Network {
                host: host.to_string(),
                port,
            })
        }
        ConnectionType::Serial => {
            let path = printer
                .serial_port
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .ok_or_else(|| {
                    PrintError::Configuration("Serial printer without serialPort".into())
                })?;
            let baud_rate = printer.baud_rate.unwrap_or(DEFAULT_BAUD_RATE);
            if baud_rate == 0 {
                return Err(PrintError::Configuration(format!("Invalid baud rate for {}", path)));
            }
            Ok(Endpoint::Serial {
                path: path.to_string(),
                baud_rate,
            })
        }
    }
}

fn hex_field(value: Option<&str>, field: &str) -> PrintResult<u16> {
    let raw = value.ok_or_else(|| PrintError::Configuration(format!("USB printer without {}", field)))?;
    parse_hex_id(raw)
        .ok_or_else(|| PrintError::Configuration(format!("Invalid {}: {:?}", field, raw)))
}
