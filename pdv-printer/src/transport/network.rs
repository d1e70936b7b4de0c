//! Network printer (raw TCP, usually port 9100)

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, instrument, warn};

use crate::error::{PrintError, PrintResult};
use crate::session::{EscPosSession, Link};

/// Network printer (TCP port 9100)
///
/// Most thermal printers support raw TCP printing on port 9100.
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    host: String,
    port: u16,
    timeout: Duration,
}

impl NetworkPrinter {
    /// Create a new network printer
    pub fn new(host: &str, port: u16) -> PrintResult<Self> {
        let host = host.trim();
        if host.is_empty() {
            return Err(PrintError::Configuration("Empty printer address".to_string()));
        }
        if port == 0 {
            return Err(PrintError::Configuration(format!("Invalid port for {}", host)));
        }

        Ok(Self {
            host: host.to_string(),
            port,
            timeout: Duration::from_secs(5),
        })
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the printer address
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Open a TCP session to the printer
    #[instrument(fields(addr = %self.addr()))]
    pub async fn connect(&self) -> PrintResult<EscPosSession<TcpLink>> {
        info!("Connecting to printer");

        let addr = self.addr();
        let stream = tokio::time::timeout(self.timeout, TcpStream::connect(addr.as_str()))
            .await
            .map_err(|_| PrintError::Timeout(format!("Connection timeout: {}", addr)))?
            .map_err(|e| PrintError::Connection(format!("{}: {}", addr, e)))?;

        info!("Connected");
        Ok(EscPosSession::new(TcpLink { stream, addr }))
    }

    /// Check if the printer is online/reachable
    #[instrument(fields(addr = %self.addr()))]
    pub async fn is_online(&self) -> bool {
        let check_timeout = Duration::from_millis(500);

        match tokio::time::timeout(check_timeout, TcpStream::connect(self.addr())).await {
            Ok(Ok(_)) => {
                info!("Printer online");
                true
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Printer offline");
                false
            }
            Err(_) => {
                warn!("Printer check timeout");
                false
            }
        }
    }
}

/// Open TCP connection to a printer
pub struct TcpLink {
    stream: TcpStream,
    addr: String,
}

#[async_trait]
impl Link for TcpLink {
    async fn send(&mut self, data: &[u8]) -> PrintResult<()> {
        self.stream.write_all(data).await.map_err(|e| {
            PrintError::Io(std::io::Error::new(
                e.kind(),
                format!("Write to {} failed: {}", self.addr, e),
            ))
        })?;
        self.stream.flush().await?;
        Ok(())
    }

    async fn release(&mut self) -> PrintResult<()> {
        self.stream.shutdown().await?;
        info!(addr = %self.addr, "Printer connection closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_printer_new() {
        let printer = NetworkPrinter::new("192.168.1.100", 9100).unwrap();
        assert_eq!(printer.addr(), "192.168.1.100:9100");
    }

    #[test]
    fn test_invalid_addr() {
        assert!(matches!(
            NetworkPrinter::new("  ", 9100),
            Err(PrintError::Configuration(_))
        ));
        assert!(NetworkPrinter::new("10.0.0.1", 0).is_err());
    }

    #[tokio::test]
    async fn test_connection_refused_is_connection_error() {
        // Bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let printer = NetworkPrinter::new("127.0.0.1", port).unwrap();
        let result = printer.connect().await;
        assert!(matches!(result, Err(PrintError::Connection(_))));
        assert!(!printer.is_online().await);
    }
}
