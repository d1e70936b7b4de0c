//! PDV print service
//!
//! Prints kitchen tickets, sale receipts, delivery orders and table comandas
//! on ESC/POS thermal printers attached over USB, TCP or serial.
//!
//! ```text
//! pdv-print/src/
//! ├── core/        # configuration
//! ├── printing/    # normalization, renderer, dispatcher, manager
//! └── utils/       # logging
//! ```

pub mod core;
pub mod printing;
pub mod utils;

pub use core::Config;
pub use printing::{
    DispatchError, FailureKind, ManagerError, PrintDispatcher, PrintManager, PrinterStatus,
    PrinterStore,
};
pub use utils::logger::{init_logger, init_logger_with_file};
