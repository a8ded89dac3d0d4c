//! Printer driver capability
//!
//! [`Connector`] opens a session with a device, [`PrinterDriver`] is the set
//! of primitives that session supports. The network implementation lives in
//! [`crate::printer`]; tests substitute their own.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::PrintResult;
use crate::types::{BarcodeOptions, CutMode, ImageOptions, QrOptions, TextStyle};

/// Where and how to reach a printer for one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterTarget {
    pub host: String,
    pub port: u16,
    /// Bound on the connection attempt
    pub timeout: Duration,
    /// Device profile name, see [`crate::DeviceProfile`]
    pub profile: String,
    /// Text encoding label for `text` calls
    pub encoding: String,
}

impl PrinterTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: Duration::from_secs(30),
            profile: "default".to_string(),
            encoding: "utf-8".to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }
}

impl fmt::Display for PrinterTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Opens printer sessions
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: PrinterDriver;

    async fn open(&self, target: &PrinterTarget) -> PrintResult<Self::Connection>;
}

/// Primitives of an open printer session
///
/// Every call is written to the device before it returns. `close` must be
/// idempotent: closing twice, or closing after a failed write, is `Ok`.
#[async_trait]
pub trait PrinterDriver: Send {
    /// Write bytes unmodified
    async fn raw(&mut self, bytes: &[u8]) -> PrintResult<()>;

    async fn text(&mut self, text: &str) -> PrintResult<()>;

    /// Apply formatting; `None` fields are left as they are
    async fn set(&mut self, style: &TextStyle) -> PrintResult<()>;

    async fn qr(&mut self, content: &str, options: &QrOptions) -> PrintResult<()>;

    async fn barcode(&mut self, code: &str, options: &BarcodeOptions) -> PrintResult<()>;

    async fn image(&mut self, path: &Path, options: &ImageOptions) -> PrintResult<()>;

    async fn cut(&mut self, mode: CutMode) -> PrintResult<()>;

    async fn feed(&mut self, lines: i64) -> PrintResult<()>;

    async fn lf(&mut self) -> PrintResult<()>;

    /// Kick the cash drawer on pin 2 or 5
    async fn cashdraw(&mut self, pin: i64) -> PrintResult<()>;

    /// `INIT`, `SELECT` or `RESET`
    async fn hw(&mut self, op: &str) -> PrintResult<()>;

    /// `LF`, `FF`, `CR`, `HT` or `VT`
    async fn control(&mut self, code: &str) -> PrintResult<()>;

    async fn line_spacing(&mut self, spacing: i64) -> PrintResult<()>;

    async fn barcode_height(&mut self, height: i64) -> PrintResult<()>;

    async fn barcode_width(&mut self, width: i64) -> PrintResult<()>;

    async fn close(&mut self) -> PrintResult<()>;
}
