//! Printer connection state held by the server

pub mod state;

pub use state::{
    JsonFileStore, PrinterManager, PrinterState, STATUS_DISCONNECTED, STATUS_NOT_CONNECTED,
    StateStore, StateStoreError,
};
