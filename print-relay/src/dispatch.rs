//! Command dispatch
//!
//! Executes one [`PrintCommand`] against an open printer session.

use crab_printer::{CutMode, ImageOptions, PrinterDriver};
use tracing::{error, warn};

use crate::command::{Command, ImageSource, PrintCommand};
use crate::error::DispatchError;
use crate::fetch::{ImageFetcher, TempAsset};

/// Bytes written before a cut so the last printed line clears the cutter
const PRE_CUT: &[u8] = b"\n\n";
/// Form feed, forces the device to print what it has buffered
pub const FORM_FEED: &[u8] = b"\x0c";

/// What happened to a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Applied,
    /// Unrecognized name, nothing was sent
    Skipped(String),
}

/// Runs commands against a driver, fetching remote images through `F`
pub struct Dispatcher<'a, F: ImageFetcher + ?Sized> {
    fetcher: &'a F,
}

impl<'a, F: ImageFetcher + ?Sized> Dispatcher<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self { fetcher }
    }

    pub async fn dispatch<D: PrinterDriver + ?Sized>(
        &self,
        driver: &mut D,
        command: &PrintCommand,
    ) -> Result<DispatchOutcome, DispatchError> {
        let result = match Command::parse(command) {
            Ok(Some(typed)) => self.apply(driver, typed).await,
            Ok(None) => {
                warn!(command = %command.name, "Unrecognized command, skipped");
                return Ok(DispatchOutcome::Skipped(command.name.clone()));
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => Ok(DispatchOutcome::Applied),
            Err(e) => {
                error!(
                    command = %command.name,
                    value = %command.value,
                    error = %e,
                    "Command failed"
                );
                Err(e)
            }
        }
    }

    async fn apply<D: PrinterDriver + ?Sized>(
        &self,
        driver: &mut D,
        command: Command,
    ) -> Result<(), DispatchError> {
        match command {
            Command::Text(text) => driver.text(&text).await?,
            Command::Lf => driver.lf().await?,
            Command::Feed(lines) => driver.feed(lines).await?,
            Command::Cut(mode) => self.cut(driver, mode).await?,
            Command::Cashdraw(pin) => driver.cashdraw(pin).await?,
            Command::Hw(op) => driver.hw(&op).await?,
            Command::Control(code) => driver.control(&code).await?,
            Command::Style(style) => driver.set(&style).await?,
            Command::Ignored => {}
            Command::LineSpacing(n) => driver.line_spacing(n).await?,
            Command::BarcodeHeight(n) => driver.barcode_height(n).await?,
            Command::BarcodeWidth(n) => driver.barcode_width(n).await?,
            Command::Qr { content, options } => driver.qr(&content, &options).await?,
            Command::Barcode { code, options } => driver.barcode(&code, &options).await?,
            Command::Image(ImageSource::Url(url)) => self.remote_image(driver, &url).await?,
            Command::Image(ImageSource::File { path, options }) => {
                driver.image(&path, &options.unwrap_or_default()).await?
            }
        }
        Ok(())
    }

    async fn cut<D: PrinterDriver + ?Sized>(
        &self,
        driver: &mut D,
        mode: CutMode,
    ) -> Result<(), DispatchError> {
        driver.raw(PRE_CUT).await?;
        driver.cut(mode).await?;
        driver.raw(FORM_FEED).await?;
        Ok(())
    }

    /// Download, print, and always remove the temporary file
    async fn remote_image<D: PrinterDriver + ?Sized>(
        &self,
        driver: &mut D,
        url: &str,
    ) -> Result<(), DispatchError> {
        let bytes = self.fetcher.fetch(url).await?;
        let asset = TempAsset::write(&bytes)?;

        let printed = driver.image(asset.path(), &ImageOptions::default()).await;

        if let Err(e) = asset.release() {
            warn!(url = url, error = %e, "Temporary image not removed");
        }
        printed.map_err(DispatchError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use crab_printer::{BarcodeOptions, PrintError, PrintResult, QrOptions, TextStyle};
    use serde_json::json;
    use std::path::{Path, PathBuf};

    /// Records calls, optionally failing one named operation
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        images: Vec<PathBuf>,
        fail_on: Option<&'static str>,
    }

    impl Recorder {
        fn record(&mut self, call: String) -> PrintResult<()> {
            let op = call.split(':').next().unwrap_or_default().to_string();
            self.calls.push(call);
            if self.fail_on == Some(op.as_str()) {
                return Err(PrintError::Io(std::io::Error::other("device gone")));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PrinterDriver for Recorder {
        async fn raw(&mut self, bytes: &[u8]) -> PrintResult<()> {
            self.record(format!("raw:{:?}", bytes))
        }
        async fn text(&mut self, text: &str) -> PrintResult<()> {
            self.record(format!("text:{}", text))
        }
        async fn set(&mut self, style: &TextStyle) -> PrintResult<()> {
            self.record(format!("set:{:?}", style.align))
        }
        async fn qr(&mut self, content: &str, _: &QrOptions) -> PrintResult<()> {
            self.record(format!("qr:{}", content))
        }
        async fn barcode(&mut self, code: &str, _: &BarcodeOptions) -> PrintResult<()> {
            self.record(format!("barcode:{}", code))
        }
        async fn image(&mut self, path: &Path, _: &ImageOptions) -> PrintResult<()> {
            self.images.push(path.to_path_buf());
            self.record("image".to_string())
        }
        async fn cut(&mut self, mode: CutMode) -> PrintResult<()> {
            self.record(format!("cut:{:?}", mode))
        }
        async fn feed(&mut self, lines: i64) -> PrintResult<()> {
            self.record(format!("feed:{}", lines))
        }
        async fn lf(&mut self) -> PrintResult<()> {
            self.record("lf".to_string())
        }
        async fn cashdraw(&mut self, pin: i64) -> PrintResult<()> {
            self.record(format!("cashdraw:{}", pin))
        }
        async fn hw(&mut self, op: &str) -> PrintResult<()> {
            self.record(format!("hw:{}", op))
        }
        async fn control(&mut self, code: &str) -> PrintResult<()> {
            self.record(format!("control:{}", code))
        }
        async fn line_spacing(&mut self, n: i64) -> PrintResult<()> {
            self.record(format!("line_spacing:{}", n))
        }
        async fn barcode_height(&mut self, n: i64) -> PrintResult<()> {
            self.record(format!("barcode_height:{}", n))
        }
        async fn barcode_width(&mut self, n: i64) -> PrintResult<()> {
            self.record(format!("barcode_width:{}", n))
        }
        async fn close(&mut self) -> PrintResult<()> {
            self.record("close".to_string())
        }
    }

    struct StaticFetcher;

    #[async_trait]
    impl ImageFetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            if url.contains("missing") {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                });
            }
            Ok(vec![0xFF, 0xD8])
        }
    }

    async fn run(
        driver: &mut Recorder,
        name: &str,
        value: serde_json::Value,
    ) -> Result<DispatchOutcome, DispatchError> {
        Dispatcher::new(&StaticFetcher)
            .dispatch(driver, &PrintCommand::new(name, value))
            .await
    }

    #[tokio::test]
    async fn test_cut_sequence() {
        let mut d = Recorder::default();
        assert_eq!(
            run(&mut d, "cut", json!("FULL")).await.unwrap(),
            DispatchOutcome::Applied
        );
        assert_eq!(d.calls, vec!["raw:[10, 10]", "cut:Full", "raw:[12]"]);
    }

    #[tokio::test]
    async fn test_unknown_is_skipped_without_calls() {
        let mut d = Recorder::default();
        let outcome = run(&mut d, "Beep", json!(3)).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Skipped("Beep".to_string()));
        assert!(d.calls.is_empty());
    }

    #[tokio::test]
    async fn test_set_with_scalar_makes_no_call() {
        let mut d = Recorder::default();
        assert_eq!(
            run(&mut d, "set", json!(true)).await.unwrap(),
            DispatchOutcome::Applied
        );
        assert!(d.calls.is_empty());
    }

    #[tokio::test]
    async fn test_alias_goes_through_set() {
        let mut d = Recorder::default();
        run(&mut d, "align", json!("center")).await.unwrap();
        assert_eq!(d.calls, vec!["set:Some(Center)"]);
    }

    #[tokio::test]
    async fn test_driver_error_propagates() {
        let mut d = Recorder {
            fail_on: Some("text"),
            ..Recorder::default()
        };
        let err = run(&mut d, "text", json!("x")).await.unwrap_err();
        assert!(matches!(err, DispatchError::Driver(PrintError::Io(_))));
    }

    #[tokio::test]
    async fn test_remote_image_temp_file_removed() {
        let mut d = Recorder::default();
        run(&mut d, "image", json!("https://img.test/logo.jpg"))
            .await
            .unwrap();
        assert_eq!(d.images.len(), 1);
        assert!(!d.images[0].exists());

        let mut failing = Recorder {
            fail_on: Some("image"),
            ..Recorder::default()
        };
        assert!(
            run(&mut failing, "image", json!("https://img.test/logo.jpg"))
                .await
                .is_err()
        );
        assert!(!failing.images[0].exists());
    }

    #[tokio::test]
    async fn test_fetch_failure_prints_nothing() {
        let mut d = Recorder::default();
        let err = run(&mut d, "image", json!("https://img.test/missing.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Fetch(FetchError::Status { status: 404, .. })
        ));
        assert!(d.calls.is_empty());
    }
}
