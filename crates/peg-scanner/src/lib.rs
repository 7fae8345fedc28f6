//! Client for the PEG scanner backend: wire decoding, view projection, display
//! formatting and the client-side state controller.

pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod state;
pub mod view;
pub mod wire;

pub use api::{connect, Backend};
pub use config::{ClientConfig, Transport};
pub use error::{DecodeError, Error, Result};
pub use state::{Scanner, ScannerSnapshot};
