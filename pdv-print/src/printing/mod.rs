//! Printing core
//!
//! - `normalize`: loosely shaped JSON → typed print jobs
//! - `renderer`: print job → formatting calls on a printer session
//! - `dispatcher`: role → printer map, one bounded attempt per job
//! - `manager`: façade translating failures into contextual errors
//! - `storage`: `printers.json` persistence

pub mod dispatcher;
pub mod manager;
pub mod money;
pub mod normalize;
pub mod renderer;
pub mod storage;

pub use dispatcher::{DispatchError, DispatchResult, PrintDispatcher, PrinterProbe, endpoint_for};
pub use manager::{FailureKind, ManagerError, ManagerResult, PrintManager, PrinterStatus};
pub use money::{CurrencyLocale, format_currency};
pub use renderer::JobRenderer;
pub use storage::{PrinterStore, PrinterStoreError, PrinterStoreResult};
