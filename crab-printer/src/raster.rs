//! 1-bit raster bitmaps
//!
//! Everything the printer prints as graphics (images, software QR codes,
//! software barcodes) is first rendered into a [`Raster`], then encoded by
//! one of the image transfer commands in [`crate::escpos`].

use crate::error::{PrintError, PrintResult};
use crate::types::QrErrorLevel;

/// QR quiet zone in modules
const QR_BORDER: u32 = 4;

/// Monochrome bitmap, row-major, `true` = black dot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<bool>,
}

impl Raster {
    /// Blank (white) raster
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![false; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.pixels[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, black: bool) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = black;
        }
    }

    /// Bytes per packed row
    pub fn row_bytes(&self) -> u32 {
        self.width.div_ceil(8)
    }

    /// Rows packed MSB-first, as GS v 0 and GS ( L expect
    pub fn packed_rows(&self) -> Vec<u8> {
        let x_bytes = self.row_bytes();
        let mut data = Vec::with_capacity((x_bytes * self.height) as usize);
        for y in 0..self.height {
            for x_byte in 0..x_bytes {
                let mut byte = 0u8;
                for bit in 0..8 {
                    if self.get(x_byte * 8 + bit, y) {
                        byte |= 1 << (7 - bit);
                    }
                }
                data.push(byte);
            }
        }
        data
    }

    /// One vertical strip packed column by column, as ESC * expects
    ///
    /// `dots` is 8 or 24; each column yields `dots / 8` bytes, top bit first.
    pub fn column_strip(&self, top: u32, dots: u32) -> Vec<u8> {
        let bytes_per_column = dots / 8;
        let mut data = Vec::with_capacity((self.width * bytes_per_column) as usize);
        for x in 0..self.width {
            for b in 0..bytes_per_column {
                let mut byte = 0u8;
                for bit in 0..8 {
                    if self.get(x, top + b * 8 + bit) {
                        byte |= 1 << (7 - bit);
                    }
                }
                data.push(byte);
            }
        }
        data
    }

    /// Pad left and right with white so the bitmap sits in the middle of `width`
    pub fn centered(&self, width: u32) -> Self {
        if self.width >= width {
            return self.clone();
        }
        let offset = (width - self.width) / 2;
        let mut out = Self::new(width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.set(x + offset, y, self.get(x, y));
            }
        }
        out
    }

    /// Split into horizontal bands of at most `rows` rows
    pub fn fragments(&self, rows: u32) -> Vec<Raster> {
        let rows = rows.max(1);
        let mut out = Vec::new();
        let mut top = 0;
        while top < self.height {
            let h = rows.min(self.height - top);
            let start = (top * self.width) as usize;
            let end = ((top + h) * self.width) as usize;
            out.push(Self {
                width: self.width,
                height: h,
                pixels: self.pixels[start..end].to_vec(),
            });
            top += h;
        }
        out
    }

    /// Render a QR code, one `box_size`-dot square per module
    pub fn qr(content: &str, ec: QrErrorLevel, box_size: u8) -> PrintResult<Self> {
        use qrcode::{Color, EcLevel, QrCode};

        let level = match ec {
            QrErrorLevel::L => EcLevel::L,
            QrErrorLevel::M => EcLevel::M,
            QrErrorLevel::Q => EcLevel::Q,
            QrErrorLevel::H => EcLevel::H,
        };
        let code = QrCode::with_error_correction_level(content, level)
            .map_err(|e| PrintError::invalid(format!("QR code generation failed: {}", e)))?;

        let modules = code.width() as u32;
        let cell = box_size.max(1) as u32;
        let side = (modules + QR_BORDER * 2) * cell;
        let mut raster = Self::new(side, side);

        for qy in 0..modules {
            for qx in 0..modules {
                if code[(qx as usize, qy as usize)] != Color::Dark {
                    continue;
                }
                let px = (qx + QR_BORDER) * cell;
                let py = (qy + QR_BORDER) * cell;
                for dy in 0..cell {
                    for dx in 0..cell {
                        raster.set(px + dx, py + dy, true);
                    }
                }
            }
        }
        Ok(raster)
    }

    /// Render barcode modules (`1` = bar) as vertical bars
    pub fn bars(modules: &[u8], module_width: u32, height: u32) -> Self {
        let module_width = module_width.max(1);
        let mut raster = Self::new(modules.len() as u32 * module_width, height);
        for (i, module) in modules.iter().enumerate() {
            if *module != 1 {
                continue;
            }
            let x0 = i as u32 * module_width;
            for x in x0..x0 + module_width {
                for y in 0..height {
                    raster.set(x, y, true);
                }
            }
        }
        raster
    }
}

#[cfg(feature = "image")]
impl Raster {
    /// Threshold an image to 1-bit, scaling it down to `max_width` if wider
    ///
    /// Opaque pixels with luma below 128 print black; transparent pixels are
    /// paper.
    pub fn from_image(img: &image::DynamicImage, max_width: u32) -> Self {
        use image::GenericImageView;

        let (w, h) = img.dimensions();
        let (new_w, new_h) = if w > max_width {
            let ratio = max_width as f64 / w as f64;
            (max_width, ((h as f64 * ratio) as u32).max(1))
        } else {
            (w, h)
        };

        let rgba = if (new_w, new_h) == (w, h) {
            img.to_rgba8()
        } else {
            img.resize_exact(new_w, new_h, image::imageops::FilterType::Nearest)
                .to_rgba8()
        };

        let mut raster = Self::new(new_w, new_h);
        for (x, y, pixel) in rgba.enumerate_pixels() {
            if pixel[3] < 128 {
                continue;
            }
            let luma =
                (0.299 * pixel[0] as f32 + 0.587 * pixel[1] as f32 + 0.114 * pixel[2] as f32) as u8;
            if luma < 128 {
                raster.set(x, y, true);
            }
        }
        raster
    }

    /// Load and threshold an image file
    ///
    /// The format is sniffed from the file content; the extension is only a
    /// fallback, so downloads saved under a fixed suffix still decode.
    #[tracing::instrument(skip(max_width))]
    pub fn load(path: &std::path::Path, max_width: u32) -> PrintResult<Self> {
        let img = image::ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| PrintError::Image(format!("{}: {}", path.display(), e)))?
            .decode()
            .map_err(|e| PrintError::Image(format!("{}: {}", path.display(), e)))?;
        let raster = Self::from_image(&img, max_width);
        tracing::debug!(
            width = raster.width(),
            height = raster.height(),
            "image rasterized"
        );
        Ok(raster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_rows_msb_first() {
        let mut r = Raster::new(10, 1);
        r.set(0, 0, true);
        r.set(9, 0, true);
        assert_eq!(r.row_bytes(), 2);
        assert_eq!(r.packed_rows(), vec![0b1000_0000, 0b0100_0000]);
    }

    #[test]
    fn test_fragments_cover_all_rows() {
        let r = Raster::new(8, 25);
        let parts = r.fragments(10);
        let heights: Vec<u32> = parts.iter().map(|p| p.height()).collect();
        assert_eq!(heights, vec![10, 10, 5]);
    }

    #[test]
    fn test_centered_pads_both_sides() {
        let mut r = Raster::new(2, 1);
        r.set(0, 0, true);
        let c = r.centered(6);
        assert_eq!(c.width(), 6);
        assert!(c.get(2, 0));
        assert!(!c.get(0, 0));
    }

    #[test]
    fn test_qr_has_quiet_zone() {
        let r = Raster::qr("hello", QrErrorLevel::L, 2).unwrap();
        // Version 1 is 21 modules, plus 4 on each side
        assert_eq!(r.width(), (21 + 8) * 2);
        assert!(!r.get(0, 0));
        // Top-left finder pattern starts right after the border
        assert!(r.get(8, 8));
    }

    #[test]
    fn test_bars() {
        let r = Raster::bars(&[1, 0, 1], 2, 3);
        assert_eq!(r.width(), 6);
        assert!(r.get(0, 2) && r.get(1, 0));
        assert!(!r.get(2, 0));
        assert!(r.get(5, 1));
    }

    #[cfg(feature = "image")]
    #[test]
    fn test_from_image_threshold_and_scale() {
        let mut img = image::RgbaImage::new(4, 2);
        img.put_pixel(0, 0, image::Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 0, 0, 0]));
        img.put_pixel(2, 0, image::Rgba([255, 255, 255, 255]));
        let r = Raster::from_image(&image::DynamicImage::ImageRgba8(img.clone()), 100);
        assert!(r.get(0, 0));
        assert!(!r.get(1, 0));
        assert!(!r.get(2, 0));

        let scaled = Raster::from_image(&image::DynamicImage::ImageRgba8(img), 2);
        assert_eq!((scaled.width(), scaled.height()), (2, 1));
    }

    #[cfg(feature = "image")]
    #[test]
    fn test_load_sniffs_format_over_extension() {
        let file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        let img = image::GrayImage::from_pixel(16, 8, image::Luma([0u8]));
        img.save_with_format(file.path(), image::ImageFormat::Png).unwrap();

        let r = Raster::load(file.path(), 576).unwrap();
        assert_eq!((r.width(), r.height()), (16, 8));
        assert!(r.get(15, 7));
    }

    #[cfg(feature = "image")]
    #[test]
    fn test_load_rejects_non_image() {
        let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        std::fs::write(file.path(), b"not an image").unwrap();
        assert!(matches!(
            Raster::load(file.path(), 576),
            Err(PrintError::Image(_))
        ));
    }
}
