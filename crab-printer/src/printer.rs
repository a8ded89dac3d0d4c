//! Network printer adapter
//!
//! Most thermal printers accept raw ESC/POS on TCP port 9100. A
//! [`NetworkConnection`] keeps one socket open for the whole job and writes
//! every driver call as soon as it is made.

use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info, instrument};

use crate::driver::{Connector, PrinterDriver, PrinterTarget};
use crate::encoding::TextCodec;
use crate::error::{PrintError, PrintResult};
use crate::profile::DeviceProfile;
use crate::session::Session;
use crate::types::{BarcodeOptions, CutMode, ImageOptions, QrOptions, TextStyle};

/// Opens TCP sessions to network printers
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkConnector;

impl NetworkConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for NetworkConnector {
    type Connection = NetworkConnection;

    #[instrument(skip(self), fields(addr = %target, profile = %target.profile))]
    async fn open(&self, target: &PrinterTarget) -> PrintResult<NetworkConnection> {
        let profile = DeviceProfile::by_name(&target.profile)?;
        let codec = TextCodec::for_label(&target.encoding);
        let addr = target.to_string();

        info!("Connecting to printer");

        let stream = tokio::time::timeout(
            target.timeout,
            TcpStream::connect((target.host.as_str(), target.port)),
        )
        .await
        .map_err(|_| PrintError::Timeout(format!("Connection timeout: {}", addr)))?
        .map_err(|e| PrintError::Connection(format!("{}: {}", addr, e)))?;

        info!(encoding = codec.name(), "Connected");

        Ok(NetworkConnection {
            stream: Some(stream),
            addr,
            session: Session::new(profile, codec),
        })
    }
}

/// An open TCP session with one printer
pub struct NetworkConnection {
    stream: Option<TcpStream>,
    addr: String,
    session: Session,
}

impl NetworkConnection {
    async fn write(&mut self, data: &[u8]) -> PrintResult<()> {
        let stream = self.stream.as_mut().ok_or(PrintError::NotConnected)?;
        if data.is_empty() {
            return Ok(());
        }

        debug!(addr = %self.addr, data_len = data.len(), "Sending");
        stream.write_all(data).await.map_err(|e| {
            PrintError::Io(std::io::Error::new(
                e.kind(),
                format!("Write failed: {}", e),
            ))
        })?;
        stream.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl PrinterDriver for NetworkConnection {
    async fn raw(&mut self, bytes: &[u8]) -> PrintResult<()> {
        self.write(bytes).await
    }

    async fn text(&mut self, text: &str) -> PrintResult<()> {
        let data = self.session.text(text);
        self.write(&data).await
    }

    async fn set(&mut self, style: &TextStyle) -> PrintResult<()> {
        let data = self.session.set(style);
        self.write(&data).await
    }

    async fn qr(&mut self, content: &str, options: &QrOptions) -> PrintResult<()> {
        let data = self.session.qr(content, options)?;
        self.write(&data).await
    }

    async fn barcode(&mut self, code: &str, options: &BarcodeOptions) -> PrintResult<()> {
        let data = self.session.barcode(code, options)?;
        self.write(&data).await
    }

    async fn image(&mut self, path: &Path, options: &ImageOptions) -> PrintResult<()> {
        let data = self.session.image(path, options)?;
        self.write(&data).await
    }

    async fn cut(&mut self, mode: CutMode) -> PrintResult<()> {
        let data = self.session.cut(mode);
        self.write(&data).await
    }

    async fn feed(&mut self, lines: i64) -> PrintResult<()> {
        let data = self.session.feed(lines)?;
        self.write(&data).await
    }

    async fn lf(&mut self) -> PrintResult<()> {
        let data = self.session.lf();
        self.write(&data).await
    }

    async fn cashdraw(&mut self, pin: i64) -> PrintResult<()> {
        let data = self.session.cashdraw(pin)?;
        self.write(&data).await
    }

    async fn hw(&mut self, op: &str) -> PrintResult<()> {
        let data = self.session.hw(op)?;
        self.write(&data).await
    }

    async fn control(&mut self, code: &str) -> PrintResult<()> {
        let data = self.session.control(code)?;
        self.write(&data).await
    }

    async fn line_spacing(&mut self, spacing: i64) -> PrintResult<()> {
        let data = self.session.line_spacing(spacing)?;
        self.write(&data).await
    }

    async fn barcode_height(&mut self, height: i64) -> PrintResult<()> {
        let data = self.session.barcode_height(height)?;
        self.write(&data).await
    }

    async fn barcode_width(&mut self, width: i64) -> PrintResult<()> {
        let data = self.session.barcode_width(width)?;
        self.write(&data).await
    }

    async fn close(&mut self) -> PrintResult<()> {
        if let Some(mut stream) = self.stream.take() {
            info!(addr = %self.addr, "Closing printer connection");
            stream.shutdown().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    async fn listener() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    #[tokio::test]
    async fn test_writes_reach_device_in_order() {
        let (listener, port) = listener().await;
        let reader = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            socket.read_to_end(&mut received).await.unwrap();
            received
        });

        let target = PrinterTarget::new("127.0.0.1", port);
        let mut conn = NetworkConnector::new().open(&target).await.unwrap();
        conn.text("Hello").await.unwrap();
        conn.lf().await.unwrap();
        conn.cut(CutMode::Partial).await.unwrap();
        conn.close().await.unwrap();

        let received = reader.await.unwrap();
        assert_eq!(received, b"Hello\n\x1dV\x01");
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (listener, port) = listener().await;
        tokio::spawn(async move {
            let _ = listener.accept().await;
        });

        let target = PrinterTarget::new("127.0.0.1", port);
        let mut conn = NetworkConnector::new().open(&target).await.unwrap();
        conn.close().await.unwrap();
        conn.close().await.unwrap();
        assert!(matches!(
            conn.text("late").await,
            Err(PrintError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_unknown_profile_rejected_before_connect() {
        let target = PrinterTarget::new("127.0.0.1", 1).with_profile("TM-FAKE");
        let result = NetworkConnector::new().open(&target).await;
        assert!(matches!(result, Err(PrintError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_refused_connection() {
        let (listener, port) = listener().await;
        drop(listener);

        let target = PrinterTarget::new("127.0.0.1", port).with_timeout(Duration::from_secs(2));
        let result = NetworkConnector::new().open(&target).await;
        assert!(matches!(
            result,
            Err(PrintError::Connection(_)) | Err(PrintError::Timeout(_))
        ));
    }
}
