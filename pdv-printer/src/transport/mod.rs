//! Printer transports
//!
//! Supports:
//! - Network printers (raw TCP, port 9100)
//! - USB printers (printer-class bulk OUT via nusb)
//! - Serial printers (RS-232 / USB-serial via serialport)
//!
//! Every transport yields a [`PrinterSession`] so job rendering never
//! depends on the physical link.

mod network;
mod serial;
mod usb;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use crate::error::{PrintError, PrintResult};
use crate::session::PrinterSession;

pub use network::{NetworkPrinter, TcpLink};
pub use serial::{SerialLink, SerialPrinter};
pub use usb::{UsbDeviceInfo, UsbLink, UsbPrinter};

/// Validated physical address of one printer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Usb { vendor_id: u16, product_id: u16 },
    Network { host: String, port: u16 },
    Serial { path: String, baud_rate: u32 },
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Usb {
                vendor_id,
                product_id,
            } => write!(f, "usb://{:04x}:{:04x}", vendor_id, product_id),
            Endpoint::Network { host, port } => write!(f, "tcp://{}:{}", host, port),
            Endpoint::Serial { path, baud_rate } => write!(f, "serial://{}@{}", path, baud_rate),
        }
    }
}

/// Opens sessions to physical printers
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a fresh session within `timeout`. Failure is terminal for the job.
    async fn open(&self, endpoint: &Endpoint, timeout: Duration)
    -> PrintResult<Box<dyn PrinterSession>>;

    /// Lightweight reachability check, avoids a full session where possible
    async fn probe(&self, endpoint: &Endpoint) -> PrintResult<()>;
}

/// Connector backed by the real OS transports
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceConnector;

impl DeviceConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for DeviceConnector {
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    async fn open(
        &self,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> PrintResult<Box<dyn PrinterSession>> {
        match endpoint {
            Endpoint::Usb {
                vendor_id,
                product_id,
            } => {
                let session = UsbPrinter::new(*vendor_id, *product_id).connect().await?;
                Ok(Box::new(session))
            }
            Endpoint::Network { host, port } => {
                let session = NetworkPrinter::new(host, *port)?
                    .with_timeout(timeout)
                    .connect()
                    .await?;
                Ok(Box::new(session))
            }
            Endpoint::Serial { path, baud_rate } => {
                let session = SerialPrinter::new(path, *baud_rate)?
                    .with_timeout(timeout)
                    .connect()
                    .await?;
                Ok(Box::new(session))
            }
        }
    }

    #[instrument(skip(self), fields(endpoint = %endpoint))]
    async fn probe(&self, endpoint: &Endpoint) -> PrintResult<()> {
        let online = match endpoint {
            Endpoint::Usb {
                vendor_id,
                product_id,
            } => {
                let printer = UsbPrinter::new(*vendor_id, *product_id);
                run_blocking("USB probe", move || Ok(printer.is_present())).await?
            }
            Endpoint::Network { host, port } => NetworkPrinter::new(host, *port)?.is_online().await,
            Endpoint::Serial { path, baud_rate } => {
                let printer = SerialPrinter::new(path, *baud_rate)?;
                run_blocking("Serial probe", move || Ok(printer.is_present())).await?
            }
        };

        if online {
            Ok(())
        } else {
            Err(PrintError::Connection(format!("Printer offline: {}", endpoint)))
        }
    }
}

/// Run a blocking device call on tokio's blocking pool
///
/// The awaiting task stays cancellable, so an enclosing timeout still fires
/// while the OS call is stuck.
pub(crate) async fn run_blocking<T, F>(what: &str, f: F) -> PrintResult<T>
where
    F: FnOnce() -> PrintResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PrintError::Connection(format!("{} task failed: {}", what, e)))?
}

/// Devices the settings screen can offer
#[derive(Debug, Clone, Default)]
pub struct AvailableDevices {
    pub usb: Vec<UsbDeviceInfo>,
    pub serial_ports: Vec<String>,
}

/// Enumerate attached USB devices and serial ports
pub fn discover_devices() -> AvailableDevices {
    AvailableDevices {
        usb: UsbPrinter::list_devices(),
        serial_ports: SerialPrinter::list_ports(),
    }
}
