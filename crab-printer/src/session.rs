//! Per-connection ESC/POS encoding
//!
//! A [`Session`] turns driver calls into the bytes for one device. It holds
//! the little state ESC/POS makes the host track (current character size)
//! plus the job's text codec and device profile. It never touches I/O, so
//! connections and tests share the same encoding.

use std::path::Path;

use crate::barcode;
use crate::encoding::TextCodec;
use crate::error::{PrintError, PrintResult};
use crate::escpos::{EscPosBuilder, FF, GRAPHICS_MAX_DATA, LF, RASTER_MAX_ROWS};
use crate::profile::DeviceProfile;
use crate::raster::Raster;
use crate::types::{
    Alignment, BarcodeFunction, BarcodeOptions, CharSize, CutMode, HriPosition, ImageImpl,
    ImageOptions, QrOptions, TextStyle,
};

pub struct Session {
    builder: EscPosBuilder,
    profile: DeviceProfile,
    size: CharSize,
}

impl Session {
    pub fn new(profile: DeviceProfile, codec: TextCodec) -> Self {
        Self {
            builder: EscPosBuilder::with_codec(codec),
            profile,
            size: CharSize::NORMAL,
        }
    }

    pub fn text(&mut self, text: &str) -> Vec<u8> {
        self.builder.text(text);
        self.builder.take()
    }

    pub fn set(&mut self, style: &TextStyle) -> Vec<u8> {
        let b = &mut self.builder;
        if let Some(align) = style.align {
            b.align(align);
        }
        if let Some(font) = style.font {
            b.font(font);
        }
        if let Some(bold) = style.bold {
            b.bold(bold);
        }
        if let Some(underline) = style.underline {
            b.underline(underline);
        }
        if let Some(size) = style.resolve_size(self.size) {
            b.char_size(size);
            self.size = size;
        }
        if let Some(invert) = style.invert {
            b.invert(invert);
        }
        if let Some(flip) = style.flip {
            b.flip(flip);
        }
        if let Some(smooth) = style.smooth {
            b.smooth(smooth);
        }
        if let Some(density) = style.density {
            b.density(density);
        }
        self.builder.take()
    }

    pub fn qr(&mut self, content: &str, opts: &QrOptions) -> PrintResult<Vec<u8>> {
        if content.is_empty() {
            return Ok(Vec::new());
        }

        if opts.native {
            if opts.center {
                self.builder.align(Alignment::Center);
            }
            self.builder.qr_native(content, opts);
            if opts.center {
                self.builder.align(Alignment::Left);
            }
            return Ok(self.builder.take());
        }

        let mut raster = Raster::qr(content, opts.ec, opts.size)?;
        if opts.center {
            raster = raster.centered(self.profile.width_dots);
        }
        self.raster(&raster, &ImageOptions::default())?;
        Ok(self.builder.take())
    }

    pub fn barcode(&mut self, code: &str, opts: &BarcodeOptions) -> PrintResult<Vec<u8>> {
        let code = barcode::normalize(code, opts.symbology);
        if opts.check {
            barcode::validate(&code, opts.symbology)?;
        }

        if opts.force_software {
            return self.software_barcode(&code, opts);
        }

        let function = opts.function.unwrap_or(BarcodeFunction::B);
        if opts.align_center {
            self.builder.align(Alignment::Center);
        }
        self.builder
            .barcode_height(opts.height)
            .barcode_width(opts.width)
            .hri_position(opts.position)
            .hri_font(opts.font);
        if self
            .builder
            .barcode_native(&code, opts.symbology, function)
            .is_none()
        {
            self.builder.take();
            return Err(PrintError::Barcode(format!(
                "{:?} cannot be printed with function {:?} ({} bytes)",
                opts.symbology,
                function,
                code.len()
            )));
        }
        if opts.align_center {
            self.builder.align(Alignment::Left);
        }
        Ok(self.builder.take())
    }

    fn software_barcode(&mut self, code: &str, opts: &BarcodeOptions) -> PrintResult<Vec<u8>> {
        let modules = barcode::software_modules(code, opts.symbology)?;
        let mut raster = Raster::bars(&modules, opts.width as u32, opts.height as u32);
        if opts.align_center {
            raster = raster.centered(self.profile.width_dots);
        }

        // HRI text without the CODE128 code set marker
        let hri = code
            .strip_prefix("{A")
            .or_else(|| code.strip_prefix("{B"))
            .or_else(|| code.strip_prefix("{C"))
            .unwrap_or(code)
            .to_string();
        let hri_line = |b: &mut EscPosBuilder| {
            if opts.align_center {
                b.align(Alignment::Center);
            }
            b.line(&hri);
            if opts.align_center {
                b.align(Alignment::Left);
            }
        };

        if matches!(opts.position, HriPosition::Above | HriPosition::Both) {
            hri_line(&mut self.builder);
        }
        if let Err(e) = self.raster(&raster, &ImageOptions::default()) {
            self.builder.take();
            return Err(e);
        }
        if matches!(opts.position, HriPosition::Below | HriPosition::Both) {
            hri_line(&mut self.builder);
        }
        Ok(self.builder.take())
    }

    #[cfg(feature = "image")]
    pub fn image(&mut self, path: &Path, opts: &ImageOptions) -> PrintResult<Vec<u8>> {
        let mut raster = Raster::load(path, self.profile.width_dots)?;
        if opts.center {
            raster = raster.centered(self.profile.width_dots);
        }
        self.raster(&raster, opts)?;
        Ok(self.builder.take())
    }

    #[cfg(not(feature = "image"))]
    pub fn image(&mut self, path: &Path, _opts: &ImageOptions) -> PrintResult<Vec<u8>> {
        Err(PrintError::Image(format!(
            "{}: image support not compiled in",
            path.display()
        )))
    }

    /// Encode a bitmap with the requested transfer command, fragment by fragment
    ///
    /// Fragments are shrunk below `fragment_height` when the command's length
    /// fields could not describe them.
    fn raster(&mut self, raster: &Raster, opts: &ImageOptions) -> PrintResult<()> {
        if raster.is_empty() {
            return Ok(());
        }
        if raster.width() > self.profile.width_dots {
            return Err(PrintError::invalid(format!(
                "Bitmap is {} dots wide, {} prints at most {}",
                raster.width(),
                self.profile.name,
                self.profile.width_dots
            )));
        }

        let limit = match opts.implementation {
            ImageImpl::BitImageRaster => RASTER_MAX_ROWS,
            ImageImpl::Graphics => GRAPHICS_MAX_DATA / raster.row_bytes(),
            ImageImpl::BitImageColumn => u32::MAX,
        };
        let rows = opts.fragment_height.min(limit);
        let (v, h) = (opts.high_density_vertical, opts.high_density_horizontal);
        for fragment in raster.fragments(rows) {
            match opts.implementation {
                ImageImpl::BitImageRaster => self.builder.raster_bit_image(&fragment, v, h),
                ImageImpl::Graphics => self.builder.graphics(&fragment, v, h),
                ImageImpl::BitImageColumn => self.builder.column_bit_image(&fragment, v, h),
            };
        }
        Ok(())
    }

    pub fn cut(&mut self, mode: CutMode) -> Vec<u8> {
        self.builder.cut(mode);
        self.builder.take()
    }

    pub fn feed(&mut self, lines: i64) -> PrintResult<Vec<u8>> {
        let n = byte_arg(lines, 0, "Feed lines")?;
        self.builder.feed(n);
        Ok(self.builder.take())
    }

    pub fn lf(&mut self) -> Vec<u8> {
        vec![LF]
    }

    pub fn cashdraw(&mut self, pin: i64) -> PrintResult<Vec<u8>> {
        match pin {
            2 => self.builder.cash_drawer(false),
            5 => self.builder.cash_drawer(true),
            other => {
                return Err(PrintError::invalid(format!(
                    "Cash drawer pin must be 2 or 5, got {}",
                    other
                )));
            }
        };
        Ok(self.builder.take())
    }

    pub fn hw(&mut self, op: &str) -> PrintResult<Vec<u8>> {
        match op.trim().to_ascii_uppercase().as_str() {
            "INIT" => {
                self.builder.reset();
                self.size = CharSize::NORMAL;
            }
            "SELECT" => {
                self.builder.select_printer();
            }
            "RESET" => {
                self.builder.hardware_reset();
                self.size = CharSize::NORMAL;
            }
            other => {
                return Err(PrintError::invalid(format!(
                    "Unknown hardware operation: {}",
                    other
                )));
            }
        }
        Ok(self.builder.take())
    }

    pub fn control(&mut self, code: &str) -> PrintResult<Vec<u8>> {
        let byte = match code.trim().to_ascii_uppercase().as_str() {
            "LF" => LF,
            "FF" => FF,
            "CR" => b'\r',
            "HT" => b'\t',
            "VT" => 0x0B,
            other => {
                return Err(PrintError::invalid(format!(
                    "Unknown control code: {}",
                    other
                )));
            }
        };
        Ok(vec![byte])
    }

    pub fn line_spacing(&mut self, spacing: i64) -> PrintResult<Vec<u8>> {
        let n = byte_arg(spacing, 0, "Line spacing")?;
        self.builder.line_spacing(n);
        Ok(self.builder.take())
    }

    pub fn barcode_height(&mut self, height: i64) -> PrintResult<Vec<u8>> {
        let n = byte_arg(height, 1, "Barcode height")?;
        self.builder.barcode_height(n);
        Ok(self.builder.take())
    }

    pub fn barcode_width(&mut self, width: i64) -> PrintResult<Vec<u8>> {
        if !(2..=6).contains(&width) {
            return Err(PrintError::invalid(format!(
                "Barcode width must be between 2 and 6, got {}",
                width
            )));
        }
        self.builder.barcode_width(width as u8);
        Ok(self.builder.take())
    }
}

fn byte_arg(value: i64, min: i64, what: &str) -> PrintResult<u8> {
    if (min..=255).contains(&value) {
        Ok(value as u8)
    } else {
        Err(PrintError::invalid(format!(
            "{} must be between {} and 255, got {}",
            what, min, value
        )))
    }
}
