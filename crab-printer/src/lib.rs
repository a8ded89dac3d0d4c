//! # crab-printer
//!
//! ESC/POS thermal printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ESC/POS command building
//! - Text encoding to the printer's code page
//! - Network printing (TCP port 9100), one session per job
//! - QR codes, barcodes and images (hardware or rasterized)
//!
//! What to print, and in which order, is decided by the caller through the
//! [`PrinterDriver`] primitives.
//!
//! ## Example
//!
//! ```ignore
//! use crab_printer::{Connector, CutMode, NetworkConnector, PrinterDriver, PrinterTarget};
//!
//! let target = PrinterTarget::new("192.168.1.100", 9100).with_profile("NT-80-V-UL");
//! let mut printer = NetworkConnector::new().open(&target).await?;
//! printer.text("Hello\n").await?;
//! printer.cut(CutMode::Partial).await?;
//! printer.close().await?;
//! ```

mod barcode;
mod driver;
mod encoding;
mod error;
mod escpos;
mod printer;
mod profile;
mod raster;
mod session;
mod types;

// Re-exports
pub use driver::{Connector, PrinterDriver, PrinterTarget};
pub use encoding::TextCodec;
pub use error::{PrintError, PrintResult};
pub use escpos::EscPosBuilder;
pub use printer::{NetworkConnection, NetworkConnector};
pub use profile::DeviceProfile;
pub use raster::Raster;
pub use session::Session;
pub use types::{
    Alignment, BarcodeFunction, BarcodeOptions, CharSize, CutMode, Font, HriPosition, ImageImpl,
    ImageOptions, QrErrorLevel, QrModel, QrOptions, Symbology, TextStyle, Underline,
};
