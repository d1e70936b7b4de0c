//! Scripted connector and session for dispatcher tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pdv_print::{Config, PrintDispatcher, PrintManager};
use pdv_printer::{
    Align, Connector, Endpoint, Font, PrintError, PrintResult, PrinterSession, Size, Style,
};
use shared::models::{PrinterConfig, PrinterRole};

/// How `open` / `probe` behave
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behavior {
    Succeed,
    Refuse,
    Hang,
}

#[derive(Debug, Default)]
pub struct Log {
    pub opens: u32,
    pub closes: u32,
    pub cuts: u32,
    pub lines: Vec<String>,
    pub endpoints: Vec<String>,
    pub open_timeouts: Vec<Duration>,
}

#[derive(Clone)]
pub struct MockConnector {
    pub log: Arc<Mutex<Log>>,
    open: Behavior,
    probe: Behavior,
    fail_at_line: Option<usize>,
    hang_at_line: Option<usize>,
}

impl MockConnector {
    pub fn new(open: Behavior) -> Self {
        Self {
            log: Arc::default(),
            open,
            probe: open,
            fail_at_line: None,
            hang_at_line: None,
        }
    }

    /// The n-th `write_line` (0-based) fails
    pub fn fail_at_line(mut self, n: usize) -> Self {
        self.fail_at_line = Some(n);
        self
    }

    /// The n-th `write_line` (0-based) never completes
    pub fn hang_at_line(mut self, n: usize) -> Self {
        self.hang_at_line = Some(n);
        self
    }

    pub fn with_probe(mut self, probe: Behavior) -> Self {
        self.probe = probe;
        self
    }

    pub fn opens(&self) -> u32 {
        self.log.lock().unwrap().opens
    }

    pub fn closes(&self) -> u32 {
        self.log.lock().unwrap().closes
    }

    pub fn lines(&self) -> Vec<String> {
        self.log.lock().unwrap().lines.clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn open(
        &self,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> PrintResult<Box<dyn PrinterSession>> {
        {
            let mut log = self.log.lock().unwrap();
            log.opens += 1;
            log.endpoints.push(endpoint.to_string());
            log.open_timeouts.push(timeout);
        }
        match self.open {
            Behavior::Succeed => Ok(Box::new(ScriptedSession {
                log: self.log.clone(),
                written: 0,
                fail_at_line: self.fail_at_line,
                hang_at_line: self.hang_at_line,
            })),
            Behavior::Refuse => Err(PrintError::Connection(format!(
                "{}: connection refused",
                endpoint
            ))),
            Behavior::Hang => std::future::pending().await,
        }
    }

    async fn probe(&self, endpoint: &Endpoint) -> PrintResult<()> {
        match self.probe {
            Behavior::Succeed => Ok(()),
            Behavior::Refuse => Err(PrintError::Connection(format!("Printer offline: {}", endpoint))),
            Behavior::Hang => std::future::pending().await,
        }
    }
}

pub struct ScriptedSession {
    log: Arc<Mutex<Log>>,
    written: usize,
    fail_at_line: Option<usize>,
    hang_at_line: Option<usize>,
}

#[async_trait]
impl PrinterSession for ScriptedSession {
    fn begin_formatting(&mut self) {}
    fn set_font(&mut self, _font: Font) {}
    fn set_align(&mut self, _align: Align) {}
    fn set_style(&mut self, _style: Style) {}
    fn set_size(&mut self, _size: Size) {}

    async fn write_line(&mut self, text: &str) -> PrintResult<()> {
        let n = self.written;
        self.written += 1;
        if self.fail_at_line == Some(n) {
            return Err(PrintError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "printer went away",
            )));
        }
        if self.hang_at_line == Some(n) {
            std::future::pending::<()>().await;
        }
        self.log.lock().unwrap().lines.push(text.to_string());
        Ok(())
    }

    async fn cut(&mut self) -> PrintResult<()> {
        self.log.lock().unwrap().cuts += 1;
        Ok(())
    }

    async fn close(self: Box<Self>) -> PrintResult<()> {
        self.log.lock().unwrap().closes += 1;
        Ok(())
    }
}

/// Short timeouts so hung operations fail fast
pub fn test_config() -> Config {
    Config {
        print_timeout_ms: 300,
        close_timeout_ms: 100,
        timezone: chrono_tz::UTC,
        ..Config::default()
    }
}

pub fn dispatcher_with(connector: &MockConnector) -> Arc<PrintDispatcher> {
    let dispatcher = PrintDispatcher::with_connector(&test_config(), Arc::new(connector.clone()));
    dispatcher.set_printer(
        PrinterRole::Kitchen,
        PrinterConfig::network("10.0.0.10", 9100).with_name("Cozinha"),
    );
    dispatcher.set_printer(
        PrinterRole::Receipt,
        PrinterConfig::usb("0x04b8", "0x0202").with_name("Caixa"),
    );
    Arc::new(dispatcher)
}

pub fn manager_with(connector: &MockConnector) -> PrintManager {
    PrintManager::new(dispatcher_with(connector))
}

/// Position of each expected line, asserting they appear in order
pub fn assert_in_order(lines: &[String], expected: &[&str]) {
    let mut from = 0;
    for want in expected {
        let found = lines[from..]
            .iter()
            .position(|l| l == want)
            .unwrap_or_else(|| panic!("{:?} not found after line {} in {:#?}", want, from, lines));
        from += found + 1;
    }
}
