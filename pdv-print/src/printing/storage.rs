//! JSON storage of the role → printer map (`printers.json`)

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use shared::models::{PrinterConfig, PrinterRole};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum PrinterStoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type PrinterStoreResult<T> = Result<T, PrinterStoreError>;

/// Printer map file
#[derive(Debug, Clone)]
pub struct PrinterStore {
    path: PathBuf,
}

impl PrinterStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the map; a missing file is an empty map
    pub fn load(&self) -> PrinterStoreResult<HashMap<PrinterRole, PrinterConfig>> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No printer map yet");
                return Ok(HashMap::new());
            }
            Err(source) => {
                return Err(PrinterStoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if data.trim().is_empty() {
            return Ok(HashMap::new());
        }
        let printers: HashMap<PrinterRole, PrinterConfig> = serde_json::from_str(&data)?;
        info!(path = %self.path.display(), count = printers.len(), "Printer map loaded");
        Ok(printers)
    }

    /// Write the map, creating parent directories as needed
    pub fn save(&self, printers: &HashMap<PrinterRole, PrinterConfig>) -> PrinterStoreResult<()> {
        let io_err = |source: std::io::Error| PrinterStoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(printers)?;
        // Atomic replace
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;

        info!(path = %self.path.display(), count = printers.len(), "Printer map saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = PrinterStore::new(dir.path().join("printers.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = PrinterStore::new(dir.path().join("config").join("printers.json"));

        let mut printers = HashMap::new();
        printers.insert(
            PrinterRole::Kitchen,
            PrinterConfig::network("192.168.0.30", 9100).with_name("Cozinha"),
        );
        printers.insert(PrinterRole::Receipt, PrinterConfig::usb("0x04b8", "0x0202"));
        store.save(&printers).unwrap();

        assert_eq!(store.load().unwrap(), printers);
    }

    #[test]
    fn test_reads_settings_screen_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("printers.json");
        std::fs::write(
            &path,
            r#"{
                "table": { "connectionType": "serial", "serialPort": "COM3", "baudRate": 19200 }
            }"#,
        )
        .unwrap();

        let printers = PrinterStore::new(&path).load().unwrap();
        let table = &printers[&PrinterRole::Table];
        assert_eq!(table.serial_port.as_deref(), Some("COM3"));
        assert_eq!(table.baud_rate, Some(19200));
        assert_eq!(table.paper_width, 48);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("printers.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            PrinterStore::new(&path).load(),
            Err(PrinterStoreError::Serialization(_))
        ));
    }
}
