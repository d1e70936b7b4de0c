//! # pdv-printer
//!
//! ESC/POS thermal printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ESC/POS command building
//! - WPC1252 encoding for Portuguese receipts
//! - Network printing (TCP port 9100)
//! - USB printing (printer-class bulk endpoint)
//! - Serial printing
//!
//! Business logic (WHAT to print) stays in `pdv-print`:
//! - Receipt and kitchen ticket rendering
//! - Printer roles, timeouts and error translation
//!
//! ## Example
//!
//! ```ignore
//! use pdv_printer::{Align, Connector, DeviceConnector, Endpoint, Size, Style};
//!
//! let endpoint = Endpoint::Network { host: "192.168.1.100".into(), port: 9100 };
//! let mut session = DeviceConnector::new()
//!     .open(&endpoint, Duration::from_secs(5))
//!     .await?;
//! session.begin_formatting();
//! session.set_align(Align::Center);
//! session.set_style(Style::Bold);
//! session.set_size(Size::Double);
//! session.write_line("COZINHA").await?;
//! session.cut().await?;
//! session.close().await?;
//! ```

mod encoding;
mod error;
mod escpos;
mod session;
mod transport;

// Re-exports
pub use encoding::{CODE_PAGE_WPC1252, encode_text};
pub use error::{PrintError, PrintResult};
pub use escpos::{Align, EscPosBuilder, Font, Size, Style};
pub use session::{EscPosSession, Link, PrinterSession};
pub use transport::{
    AvailableDevices, Connector, DeviceConnector, Endpoint, NetworkPrinter, SerialPrinter,
    UsbDeviceInfo, UsbPrinter, discover_devices,
};
