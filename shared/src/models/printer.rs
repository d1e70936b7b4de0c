//! Printer Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default paper width in characters (80mm paper)
pub const DEFAULT_PAPER_WIDTH: usize = 48;

/// Default serial baud rate
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default raw TCP port for network printers
pub const DEFAULT_NETWORK_PORT: u16 = 9100;

/// Physical connection method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Usb,
    Network,
    Serial,
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionType::Usb => write!(f, "usb"),
            ConnectionType::Network => write!(f, "network"),
            ConnectionType::Serial => write!(f, "serial"),
        }
    }
}

/// Logical purpose of a configured printer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrinterRole {
    /// Kitchen tickets and delivery orders
    Kitchen,
    /// Cashier receipts
    Receipt,
    /// Table comandas (falls back to the receipt printer)
    Table,
}

impl PrinterRole {
    pub const ALL: [PrinterRole; 3] = [PrinterRole::Kitchen, PrinterRole::Receipt, PrinterRole::Table];

    /// Role used when nothing is configured for this one
    pub fn fallback(self) -> Option<PrinterRole> {
        match self {
            PrinterRole::Table => Some(PrinterRole::Receipt),
            _ => None,
        }
    }
}

impl fmt::Display for PrinterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrinterRole::Kitchen => f.pad("kitchen"),
            PrinterRole::Receipt => f.pad("receipt"),
            PrinterRole::Table => f.pad("table"),
        }
    }
}

impl std::str::FromStr for PrinterRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kitchen" | "cozinha" => Ok(PrinterRole::Kitchen),
            "receipt" | "caixa" | "cupom" => Ok(PrinterRole::Receipt),
            "table" | "mesa" => Ok(PrinterRole::Table),
            other => Err(format!("Unknown printer role: {}", other)),
        }
    }
}

/// Physical printer configuration
///
/// Flat shape as edited by the settings screen. Only the field group
/// selected by `connection_type` may be populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub connection_type: ConnectionType,

    // USB (hex encoded, "0x04b8" or "04b8")
    #[serde(default)]
    pub vendor_id: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,

    // Network
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,

    // Serial
    #[serde(default)]
    pub serial_port: Option<String>,
    #[serde(default)]
    pub baud_rate: Option<u32>,

    /// Characters per line: 48 for 80mm, 32 for 58mm
    #[serde(default = "default_paper_width")]
    pub paper_width: usize,

    /// Per-printer override of the print timeout
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_paper_width() -> usize {
    DEFAULT_PAPER_WIDTH
}

impl PrinterConfig {
    fn empty(connection_type: ConnectionType) -> Self {
        Self {
            name: None,
            connection_type,
            vendor_id: None,
            product_id: None,
            ip: None,
            port: None,
            serial_port: None,
            baud_rate: None,
            paper_width: DEFAULT_PAPER_WIDTH,
            timeout_ms: None,
        }
    }

    pub fn usb(vendor_id: impl Into<String>, product_id: impl Into<String>) -> Self {
        Self {
            vendor_id: Some(vendor_id.into()),
            product_id: Some(product_id.into()),
            ..Self::empty(ConnectionType::Usb)
        }
    }

    pub fn network(ip: impl Into<String>, port: u16) -> Self {
        Self {
            ip: Some(ip.into()),
            port: Some(port),
            ..Self::empty(ConnectionType::Network)
        }
    }

    pub fn serial(path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            serial_port: Some(path.into()),
            baud_rate: Some(baud_rate),
            ..Self::empty(ConnectionType::Serial)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_paper_width(mut self, width: usize) -> Self {
        self.paper_width = width;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Human readable label for messages and logs
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        match self.connection_type {
            ConnectionType::Usb => format!(
                "USB {}:{}",
                self.vendor_id.as_deref().unwrap_or("?"),
                self.product_id.as_deref().unwrap_or("?")
            ),
            ConnectionType::Network => format!(
                "{}:{}",
                self.ip.as_deref().unwrap_or("?"),
                self.port.unwrap_or(DEFAULT_NETWORK_PORT)
            ),
            ConnectionType::Serial => self.serial_port.clone().unwrap_or_else(|| "serial".into()),
        }
    }

    /// Which connection field groups carry a value
    pub fn populated_groups(&self) -> Vec<ConnectionType> {
        let mut groups = Vec::new();
        if self.vendor_id.is_some() || self.product_id.is_some() {
            groups.push(ConnectionType::Usb);
        }
        if self.ip.is_some() || self.port.is_some() {
            groups.push(ConnectionType::Network);
        }
        if self.serial_port.is_some() || self.baud_rate.is_some() {
            groups.push(ConnectionType::Serial);
        }
        groups
    }
}

/// Parse a hex encoded USB id ("0x04b8", "04B8")
pub fn parse_hex_id(value: &str) -> Option<u16> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return None;
    }
    u16::from_str_radix(digits, 16).ok()
}
