//! ESC/POS command builder
//!
//! Provides a fluent API for building ESC/POS print data.

use crate::encoding::TextCodec;
use crate::raster::Raster;
use crate::types::{
    Alignment, BarcodeFunction, CharSize, CutMode, Font, HriPosition, QrOptions, Symbology,
    Underline,
};

pub const ESC: u8 = 0x1B;
pub const GS: u8 = 0x1D;
pub const LF: u8 = 0x0A;
pub const FF: u8 = 0x0C;

/// Rows a GS v 0 header can declare (yL yH)
pub const RASTER_MAX_ROWS: u32 = 0xFFFF;
/// Bitmap bytes one GS ( L store can carry: pL pH also counts 10 header bytes
pub const GRAPHICS_MAX_DATA: u32 = 0xFFFF - 10;

/// ESC/POS command builder
///
/// Builds ESC/POS byte sequences for thermal printers.
/// Text is encoded with the builder's [`TextCodec`] as it is written.
pub struct EscPosBuilder {
    buf: Vec<u8>,
    codec: TextCodec,
}

impl EscPosBuilder {
    /// Create an empty builder encoding text as UTF-8
    pub fn new() -> Self {
        Self::with_codec(TextCodec::utf8())
    }

    pub fn with_codec(codec: TextCodec) -> Self {
        Self {
            buf: Vec::with_capacity(256),
            codec,
        }
    }

    // === Text Output ===

    /// Write text in the builder's encoding
    pub fn text(&mut self, s: &str) -> &mut Self {
        let bytes = self.codec.encode(s);
        self.buf.extend_from_slice(&bytes);
        self
    }

    /// Write text followed by newline
    pub fn line(&mut self, s: &str) -> &mut Self {
        self.text(s);
        self.buf.push(LF);
        self
    }

    /// Print and feed n lines (ESC d n)
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, b'd', lines]);
        self
    }

    // === Formatting ===

    pub fn align(&mut self, align: Alignment) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, b'a', align.code()]);
        self
    }

    pub fn font(&mut self, font: Font) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, b'M', font.code()]);
        self
    }

    pub fn bold(&mut self, on: bool) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, b'E', on as u8]);
        self
    }

    pub fn underline(&mut self, mode: Underline) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, b'-', mode.code()]);
        self
    }

    /// Character magnification (GS ! n)
    pub fn char_size(&mut self, size: CharSize) -> &mut Self {
        self.buf.extend_from_slice(&[GS, b'!', size.code()]);
        self
    }

    /// White on black (GS B n)
    pub fn invert(&mut self, on: bool) -> &mut Self {
        self.buf.extend_from_slice(&[GS, b'B', on as u8]);
        self
    }

    /// Upside-down printing (ESC { n)
    pub fn flip(&mut self, on: bool) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, b'{', on as u8]);
        self
    }

    /// Smoothing (GS b n)
    pub fn smooth(&mut self, on: bool) -> &mut Self {
        self.buf.extend_from_slice(&[GS, b'b', on as u8]);
        self
    }

    /// Print density step, 0 lightest to 8 darkest (GS | n)
    pub fn density(&mut self, n: u8) -> &mut Self {
        self.buf.extend_from_slice(&[GS, b'|', n]);
        self
    }

    /// Line spacing in motion units (ESC 3 n)
    pub fn line_spacing(&mut self, n: u8) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, b'3', n]);
        self
    }

    /// Default line spacing (ESC 2)
    pub fn default_line_spacing(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, b'2']);
        self
    }

    // === Paper Control ===

    /// Cut paper (GS V 0 full, GS V 1 partial)
    pub fn cut(&mut self, mode: CutMode) -> &mut Self {
        let m = match mode {
            CutMode::Full => 0x00,
            CutMode::Partial => 0x01,
        };
        self.buf.extend_from_slice(&[GS, b'V', m]);
        self
    }

    // === Cash Drawer ===

    /// Kick pulse on connector pin 2 (m=0) or pin 5 (m=1)
    pub fn cash_drawer(&mut self, pin5: bool) -> &mut Self {
        // ESC p m t1 t2
        self.buf.extend_from_slice(&[ESC, b'p', pin5 as u8, 25, 250]);
        self
    }

    // === Hardware ===

    /// Initialize printer (ESC @)
    pub fn reset(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, b'@']);
        self
    }

    /// Select peripheral device (ESC = 1)
    pub fn select_printer(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, b'=', 0x01]);
        self
    }

    /// Hardware reset (ESC ? LF NUL)
    pub fn hardware_reset(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, b'?', LF, 0x00]);
        self
    }

    // === QR Code ===

    /// Print a QR code with the printer's own encoder (GS ( k)
    pub fn qr_native(&mut self, data: &str, opts: &QrOptions) -> &mut Self {
        // Function 165: Select model
        self.buf
            .extend_from_slice(&[GS, b'(', b'k', 0x04, 0x00, 0x31, 0x41, opts.model.code(), 0x00]);

        // Function 167: Set module size
        self.buf
            .extend_from_slice(&[GS, b'(', b'k', 0x03, 0x00, 0x31, 0x43, opts.size]);

        // Function 169: Set error correction
        self.buf
            .extend_from_slice(&[GS, b'(', b'k', 0x03, 0x00, 0x31, 0x45, opts.ec.code()]);

        // Function 180: Store data
        let data_bytes = data.as_bytes();
        let len = data_bytes.len() + 3;
        let p_l = (len & 0xFF) as u8;
        let p_h = ((len >> 8) & 0xFF) as u8;
        self.buf
            .extend_from_slice(&[GS, b'(', b'k', p_l, p_h, 0x31, 0x50, 0x30]);
        self.buf.extend_from_slice(data_bytes);

        // Function 181: Print
        self.buf
            .extend_from_slice(&[GS, b'(', b'k', 0x03, 0x00, 0x31, 0x51, 0x30]);

        self
    }

    // === Barcode ===

    /// Bar height in dots (GS h n)
    pub fn barcode_height(&mut self, n: u8) -> &mut Self {
        self.buf.extend_from_slice(&[GS, b'h', n]);
        self
    }

    /// Module width (GS w n)
    pub fn barcode_width(&mut self, n: u8) -> &mut Self {
        self.buf.extend_from_slice(&[GS, b'w', n]);
        self
    }

    /// HRI text position (GS H n)
    pub fn hri_position(&mut self, pos: HriPosition) -> &mut Self {
        self.buf.extend_from_slice(&[GS, b'H', pos.code()]);
        self
    }

    /// HRI text font (GS f n)
    pub fn hri_font(&mut self, font: Font) -> &mut Self {
        self.buf.extend_from_slice(&[GS, b'f', font.code()]);
        self
    }

    /// Print barcode data (GS k)
    ///
    /// Function A terminates the data with NUL, function B prefixes its
    /// length. Returns `None` when the symbology has no function A form or
    /// the payload is too long for function B.
    pub fn barcode_native(
        &mut self,
        data: &str,
        symbology: Symbology,
        function: BarcodeFunction,
    ) -> Option<&mut Self> {
        let bytes = data.as_bytes();
        match function {
            BarcodeFunction::A => {
                let m = symbology.function_a()?;
                self.buf.extend_from_slice(&[GS, b'k', m]);
                self.buf.extend_from_slice(bytes);
                self.buf.push(0x00);
            }
            BarcodeFunction::B => {
                let n = u8::try_from(bytes.len()).ok()?;
                self.buf
                    .extend_from_slice(&[GS, b'k', symbology.function_b(), n]);
                self.buf.extend_from_slice(bytes);
            }
        }
        Some(self)
    }

    // === Graphics ===

    /// Raster bit image (GS v 0 m xL xH yL yH d...)
    ///
    /// `m`: 0 normal, 1 double width, 2 double height, 3 quadruple.
    /// At most [`RASTER_MAX_ROWS`] rows per call.
    pub fn raster_bit_image(&mut self, raster: &Raster, high_v: bool, high_h: bool) -> &mut Self {
        let m = (if high_h { 0 } else { 1 }) + (if high_v { 0 } else { 2 });
        let x_bytes = raster.row_bytes();
        let h = raster.height();

        self.buf.extend_from_slice(&[GS, b'v', b'0', m]);
        self.buf.push(x_bytes as u8);
        self.buf.push((x_bytes >> 8) as u8);
        self.buf.push(h as u8);
        self.buf.push((h >> 8) as u8);
        self.buf.extend_from_slice(&raster.packed_rows());
        self
    }

    /// Graphics store + print (GS ( L, functions 112 and 50)
    ///
    /// The packed bitmap must fit in [`GRAPHICS_MAX_DATA`] bytes.
    pub fn graphics(&mut self, raster: &Raster, high_v: bool, high_h: bool) -> &mut Self {
        let bx = if high_h { 0x01 } else { 0x02 };
        let by = if high_v { 0x01 } else { 0x02 };
        let data = raster.packed_rows();
        let w = raster.width();
        let h = raster.height();

        let len = data.len() + 10;
        let p_l = (len & 0xFF) as u8;
        let p_h = ((len >> 8) & 0xFF) as u8;
        self.buf
            .extend_from_slice(&[GS, b'(', b'L', p_l, p_h, 0x30, 0x70, 0x30, bx, by, 0x31]);
        self.buf
            .extend_from_slice(&[w as u8, (w >> 8) as u8, h as u8, (h >> 8) as u8]);
        self.buf.extend_from_slice(&data);

        // Function 50: print buffered graphics
        self.buf
            .extend_from_slice(&[GS, b'(', b'L', 0x02, 0x00, 0x30, 0x32]);
        self
    }

    /// Column bit image (ESC * m nL nH d...), one strip per line
    pub fn column_bit_image(&mut self, raster: &Raster, high_v: bool, high_h: bool) -> &mut Self {
        let dots: u32 = if high_v { 24 } else { 8 };
        let m = (if high_v { 32 } else { 0 }) + (if high_h { 1 } else { 0 });
        let w = raster.width();

        self.line_spacing(dots as u8);
        let mut top = 0;
        while top < raster.height() {
            self.buf
                .extend_from_slice(&[ESC, b'*', m, w as u8, (w >> 8) as u8]);
            self.buf.extend_from_slice(&raster.column_strip(top, dots));
            self.buf.push(LF);
            top += dots;
        }
        self.default_line_spacing();
        self
    }

    // === Raw Commands ===

    /// Write raw bytes directly
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    // === Build ===

    /// Take the accumulated bytes, leaving the builder empty
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}

impl Default for EscPosBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{QrErrorLevel, QrModel};

    #[test]
    fn test_builder_basic() {
        let mut b = EscPosBuilder::new();
        b.align(Alignment::Center)
            .char_size(CharSize::new(2, 2).unwrap())
            .line("TITLE")
            .char_size(CharSize::NORMAL)
            .align(Alignment::Left);

        let data = b.take();
        assert_eq!(&data[..6], &[ESC, b'a', 1, GS, b'!', 0x11]);
        assert!(String::from_utf8_lossy(&data).contains("TITLE\n"));
    }

    #[test]
    fn test_text_uses_codec() {
        let mut b = EscPosBuilder::with_codec(TextCodec::for_label("gbk"));
        b.text("你");
        assert_eq!(b.take(), vec![0xC4, 0xE3]);
    }

    #[test]
    fn test_cut_modes() {
        let mut b = EscPosBuilder::new();
        b.cut(CutMode::Partial).cut(CutMode::Full);
        assert_eq!(b.take(), vec![GS, b'V', 1, GS, b'V', 0]);
    }

    #[test]
    fn test_qr_native_layout() {
        let opts = QrOptions {
            size: 4,
            ec: QrErrorLevel::M,
            model: QrModel::Model2,
            native: true,
            center: false,
        };
        let mut b = EscPosBuilder::new();
        b.qr_native("abc", &opts);
        let data = b.take();
        assert_eq!(data[7], 50); // model 2
        assert_eq!(data[16], 4); // module size
        assert_eq!(data[24], 49); // EC level M
        // Store: pL = 3 + 3
        assert_eq!(&data[25..33], &[GS, b'(', b'k', 6, 0, 0x31, 0x50, 0x30]);
        assert_eq!(&data[33..36], b"abc");
    }

    #[test]
    fn test_barcode_function_forms() {
        let mut b = EscPosBuilder::new();
        assert!(
            b.barcode_native("123", Symbology::Code128, BarcodeFunction::A)
                .is_none()
        );
        b.barcode_native("12", Symbology::Code39, BarcodeFunction::A)
            .unwrap();
        assert_eq!(b.take(), vec![GS, b'k', 4, b'1', b'2', 0]);

        b.barcode_native("{B1", Symbology::Code128, BarcodeFunction::B)
            .unwrap();
        assert_eq!(b.take(), vec![GS, b'k', 73, 3, b'{', b'B', b'1']);
    }

    #[test]
    fn test_raster_header() {
        let raster = Raster::new(16, 3);
        let mut b = EscPosBuilder::new();
        b.raster_bit_image(&raster, true, true);
        let data = b.take();
        assert_eq!(&data[..8], &[GS, b'v', b'0', 0, 2, 0, 3, 0]);
        assert_eq!(data.len(), 8 + 6);
    }

    #[test]
    fn test_column_image_strips() {
        let raster = Raster::new(4, 30);
        let mut b = EscPosBuilder::new();
        b.column_bit_image(&raster, true, true);
        let data = b.take();
        // ESC 3 24, two strips of (5 header + 4*3 data + LF), ESC 2
        assert_eq!(data.len(), 3 + 2 * (5 + 12 + 1) + 2);
        assert_eq!(&data[3..6], &[ESC, b'*', 33]);
    }
}
