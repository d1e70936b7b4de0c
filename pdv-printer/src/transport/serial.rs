//! Serial printer using the `serialport` crate
//!
//! `serialport` is blocking, so open and writes run on tokio's blocking pool.

use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use serialport::SerialPort;
use tracing::{info, instrument};

use crate::error::{PrintError, PrintResult};
use crate::session::{EscPosSession, Link};
use super::run_blocking;

/// Serial printer (RS-232 or USB-serial adapter)
#[derive(Debug, Clone)]
pub struct SerialPrinter {
    path: String,
    baud_rate: u32,
    timeout: Duration,
}

impl SerialPrinter {
    pub fn new(path: &str, baud_rate: u32) -> PrintResult<Self> {
        let path = path.trim();
        if path.is_empty() {
            return Err(PrintError::Configuration("Empty serial port path".to_string()));
        }
        if baud_rate == 0 {
            return Err(PrintError::Configuration(format!("Invalid baud rate for {}", path)));
        }
        Ok(Self {
            path: path.to_string(),
            baud_rate,
            timeout: Duration::from_secs(5),
        })
    }

    /// Set the per-write timeout of the port
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// List available serial port names on the system.
    pub fn list_ports() -> Vec<String> {
        serialport::available_ports()
            .unwrap_or_default()
            .into_iter()
            .map(|p| p.port_name)
            .collect()
    }

    /// Presence check without opening the port
    pub fn is_present(&self) -> bool {
        Self::list_ports().iter().any(|p| p == &self.path)
    }

    /// Open the serial port
    #[instrument(fields(path = %self.path, baud = self.baud_rate))]
    pub async fn connect(&self) -> PrintResult<EscPosSession<SerialLink>> {
        let path = self.path.clone();
        let baud_rate = self.baud_rate;
        let timeout = self.timeout;

        let port = run_blocking("Serial open", move || {
            serialport::new(&path, baud_rate)
                .timeout(timeout)
                .open()
                .map_err(|e| PrintError::Connection(format!("{}: {}", path, e)))
        })
        .await?;

        info!("Serial port opened");
        Ok(EscPosSession::new(SerialLink {
            port: Some(port),
            path: self.path.clone(),
        }))
    }
}

/// Open serial port
pub struct SerialLink {
    // Taken while a blocking write is in flight
    port: Option<Box<dyn SerialPort>>,
    path: String,
}

#[async_trait]
impl Link for SerialLink {
    async fn send(&mut self, data: &[u8]) -> PrintResult<()> {
        let mut port = self
            .port
            .take()
            .ok_or_else(|| PrintError::Connection(format!("{}: port already closed", self.path)))?;
        let data = data.to_vec();

        let (port, result) = tokio::task::spawn_blocking(move || {
            let result = port.write_all(&data).and_then(|_| port.flush());
            (port, result)
        })
        .await
        .map_err(|e| PrintError::Connection(format!("Serial write task failed: {}", e)))?;

        self.port = Some(port);
        result.map_err(|e| {
            PrintError::Io(std::io::Error::new(
                e.kind(),
                format!("Write to {} failed: {}", self.path, e),
            ))
        })
    }

    async fn release(&mut self) -> PrintResult<()> {
        if self.port.take().is_some() {
            info!(path = %self.path, "Serial port closed");
        }
        Ok(())
    }
}
