//! USB printer using the `nusb` crate
//!
//! Receipt printers expose a USB Printer class (bInterfaceClass = 7)
//! interface with a bulk OUT endpoint that accepts raw ESC/POS.

use async_trait::async_trait;
use nusb::transfer::{Direction, EndpointType};
use tracing::{info, instrument, warn};

use crate::error::{PrintError, PrintResult};
use crate::session::{EscPosSession, Link};
use super::run_blocking;

/// USB Printer class code (bInterfaceClass).
const USB_CLASS_PRINTER: u8 = 7;

/// Attached USB device, as listed for the settings screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbDeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub description: String,
    pub is_printer: bool,
}

/// USB printer addressed by vendor/product id
#[derive(Debug, Clone, Copy)]
pub struct UsbPrinter {
    vendor_id: u16,
    product_id: u16,
}

impl UsbPrinter {
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }

    fn id(&self) -> String {
        format!("{:04x}:{:04x}", self.vendor_id, self.product_id)
    }

    /// List all USB devices currently connected.
    pub fn list_devices() -> Vec<UsbDeviceInfo> {
        let Ok(devices) = nusb::list_devices() else {
            return Vec::new();
        };

        devices
            .map(|dev| {
                let product = dev.product_string().unwrap_or_default();
                let description = if product.is_empty() {
                    format!(
                        "{} (VID:{:04X} PID:{:04X})",
                        dev.manufacturer_string().unwrap_or_default(),
                        dev.vendor_id(),
                        dev.product_id()
                    )
                } else {
                    product.to_string()
                };
                UsbDeviceInfo {
                    vendor_id: dev.vendor_id(),
                    product_id: dev.product_id(),
                    description,
                    is_printer: dev.interfaces().any(|i| i.class() == USB_CLASS_PRINTER),
                }
            })
            .collect()
    }

    /// Enumeration-only presence check, no interface is claimed
    pub fn is_present(&self) -> bool {
        Self::list_devices()
            .iter()
            .any(|d| d.vendor_id == self.vendor_id && d.product_id == self.product_id)
    }

    /// Open the device and claim its printer interface
    ///
    /// Enumeration, open and claim are blocking `nusb` calls, so they run on
    /// the blocking pool.
    #[instrument(fields(device = %self.id()))]
    pub async fn connect(&self) -> PrintResult<EscPosSession<UsbLink>> {
        let printer = *self;
        let link = run_blocking("USB open", move || printer.claim()).await?;
        Ok(EscPosSession::new(link))
    }

    fn claim(&self) -> PrintResult<UsbLink> {
        let devices = nusb::list_devices()
            .map_err(|e| PrintError::Connection(format!("USB enumeration failed: {}", e)))?;

        let mut candidates: Vec<nusb::DeviceInfo> = devices
            .filter(|d| d.vendor_id() == self.vendor_id && d.product_id() == self.product_id)
            .collect();

        if candidates.is_empty() {
            return Err(PrintError::Connection(format!(
                "USB device {} not found",
                self.id()
            )));
        }
        if candidates.len() > 1 {
            warn!(count = candidates.len(), "Multiple USB devices match, using the first");
        }
        let dev_info = candidates.swap_remove(0);

        let iface_number = dev_info
            .interfaces()
            .find(|iface| iface.class() == USB_CLASS_PRINTER)
            .map(|iface| iface.interface_number())
            .ok_or_else(|| {
                PrintError::Connection(format!(
                    "USB device {} has no printer-class interface",
                    self.id()
                ))
            })?;

        let device = dev_info
            .open()
            .map_err(|e| PrintError::Connection(format!("{}: failed to open device: {}", self.id(), e)))?;

        let ep_out = discover_bulk_out(&device, iface_number)
            .ok_or_else(|| {
                PrintError::Connection(format!(
                    "{}: no bulk OUT endpoint on printer interface",
                    self.id()
                ))
            })?;

        // On Linux the usblp kernel driver may hold the interface
        let interface = device
            .detach_and_claim_interface(iface_number)
            .map_err(|e| {
                PrintError::Connection(format!(
                    "{}: failed to claim interface {}: {}",
                    self.id(),
                    iface_number,
                    e
                ))
            })?;

        info!(interface = iface_number, endpoint = ep_out, "USB printer claimed");
        Ok(UsbLink {
            interface,
            ep_out,
            device: self.id(),
        })
    }
}

/// Walk the active configuration to find the first bulk OUT endpoint
fn discover_bulk_out(device: &nusb::Device, interface_number: u8) -> Option<u8> {
    let config = device.active_configuration().ok()?;

    for alt in config.interface_alt_settings() {
        if alt.interface_number() != interface_number || alt.alternate_setting() != 0 {
            continue;
        }
        for ep in alt.endpoints() {
            if ep.transfer_type() == EndpointType::Bulk && ep.direction() == Direction::Out {
                return Some(ep.address());
            }
        }
    }
    None
}

/// Claimed USB printer interface
pub struct UsbLink {
    interface: nusb::Interface,
    ep_out: u8,
    device: String,
}

#[async_trait]
impl Link for UsbLink {
    async fn send(&mut self, data: &[u8]) -> PrintResult<()> {
        let completion = self.interface.bulk_out(self.ep_out, data.to_vec()).await;
        completion.status.map_err(|e| {
            PrintError::Io(std::io::Error::other(format!(
                "USB bulk OUT to {}: {}",
                self.device, e
            )))
        })
    }

    async fn release(&mut self) -> PrintResult<()> {
        // Interface is released when the link is dropped
        info!(device = %self.device, "USB printer released");
        Ok(())
    }
}
