//! Typed options for driver calls
//!
//! Every parser here is strict: a name the device does not understand is a
//! [`PrintError::InvalidArgument`], never a silent default. Defaults live in
//! the `Default` impls and match the usual ESC/POS driver conventions.

use crate::error::{PrintError, PrintResult};

/// Text alignment (ESC a n)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn parse(s: &str) -> PrintResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" | "centre" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(PrintError::invalid(format!("Unknown alignment: {}", other))),
        }
    }

    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Center => 1,
            Self::Right => 2,
        }
    }
}

/// Character font (ESC M n)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Font {
    #[default]
    A,
    B,
}

impl Font {
    pub fn parse(s: &str) -> PrintResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "0" => Ok(Self::A),
            "b" | "1" => Ok(Self::B),
            other => Err(PrintError::invalid(format!("Unknown font: {}", other))),
        }
    }

    pub(crate) fn code(self) -> u8 {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

/// Underline mode (ESC - n)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Underline {
    #[default]
    Off,
    Single,
    Double,
}

impl Underline {
    pub fn from_level(level: i64) -> PrintResult<Self> {
        match level {
            0 => Ok(Self::Off),
            1 => Ok(Self::Single),
            2 => Ok(Self::Double),
            other => Err(PrintError::invalid(format!(
                "Underline must be 0, 1 or 2, got {}",
                other
            ))),
        }
    }

    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Single => 1,
            Self::Double => 2,
        }
    }
}

/// Character magnification, 1..=8 in each direction (GS ! n)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharSize {
    pub width: u8,
    pub height: u8,
}

impl CharSize {
    pub const NORMAL: Self = Self {
        width: 1,
        height: 1,
    };

    pub fn new(width: i64, height: i64) -> PrintResult<Self> {
        Ok(Self {
            width: magnification(width, "width")?,
            height: magnification(height, "height")?,
        })
    }

    /// Parse a size name
    ///
    /// - `normal`
    /// - `2h` / `double_height`
    /// - `2w` / `double_width`
    /// - `2x` / `double`
    /// - `WxH` (e.g. `3x2`)
    pub fn parse(s: &str) -> PrintResult<Self> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "normal" => Ok(Self::NORMAL),
            "2h" | "double_height" => Self::new(1, 2),
            "2w" | "double_width" => Self::new(2, 1),
            "2x" | "double" => Self::new(2, 2),
            _ => {
                let (w, h) = name
                    .split_once('x')
                    .ok_or_else(|| PrintError::invalid(format!("Unknown text size: {}", s)))?;
                let w = w
                    .parse::<i64>()
                    .map_err(|_| PrintError::invalid(format!("Unknown text size: {}", s)))?;
                let h = h
                    .parse::<i64>()
                    .map_err(|_| PrintError::invalid(format!("Unknown text size: {}", s)))?;
                Self::new(w, h)
            }
        }
    }

    pub(crate) fn code(self) -> u8 {
        ((self.width - 1) << 4) | (self.height - 1)
    }
}

impl Default for CharSize {
    fn default() -> Self {
        Self::NORMAL
    }
}

fn magnification(value: i64, what: &str) -> PrintResult<u8> {
    if (1..=8).contains(&value) {
        Ok(value as u8)
    } else {
        Err(PrintError::invalid(format!(
            "Text {} must be between 1 and 8, got {}",
            what, value
        )))
    }
}

/// Formatting changes for `set`
///
/// `None` fields leave the current device state untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextStyle {
    pub align: Option<Alignment>,
    pub font: Option<Font>,
    pub bold: Option<bool>,
    pub underline: Option<Underline>,
    pub size: Option<CharSize>,
    pub width: Option<u8>,
    pub height: Option<u8>,
    /// `Some(false)` ignores `width`/`height` in favour of the `double_*` flags
    pub custom_size: Option<bool>,
    pub double_width: Option<bool>,
    pub double_height: Option<bool>,
    pub normal_textsize: Option<bool>,
    pub invert: Option<bool>,
    pub flip: Option<bool>,
    pub smooth: Option<bool>,
    /// Print density step, 0..=8 (GS | n)
    pub density: Option<u8>,
}

impl TextStyle {
    pub fn with_align(align: Alignment) -> Self {
        Self {
            align: Some(align),
            ..Self::default()
        }
    }

    pub fn with_font(font: Font) -> Self {
        Self {
            font: Some(font),
            ..Self::default()
        }
    }

    pub fn with_bold(bold: bool) -> Self {
        Self {
            bold: Some(bold),
            ..Self::default()
        }
    }

    pub fn with_underline(underline: Underline) -> Self {
        Self {
            underline: Some(underline),
            ..Self::default()
        }
    }

    pub fn with_size(size: CharSize) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    /// Resolve the character size this style leaves the device in
    ///
    /// Precedence: `normal_textsize`, then `size`, then explicit
    /// `width`/`height` (unless `custom_size` is false), then the `double_*`
    /// flags.
    pub fn resolve_size(&self, current: CharSize) -> Option<CharSize> {
        if self.normal_textsize == Some(true) {
            return Some(CharSize::NORMAL);
        }
        if let Some(size) = self.size {
            return Some(size);
        }
        let (width, height) = if self.custom_size == Some(false) {
            (None, None)
        } else {
            (self.width, self.height)
        };
        if width.is_none()
            && height.is_none()
            && self.double_width.is_none()
            && self.double_height.is_none()
        {
            return None;
        }

        let mut size = current;
        if let Some(w) = width {
            size.width = w;
        } else if let Some(dw) = self.double_width {
            size.width = if dw { 2 } else { 1 };
        }
        if let Some(h) = height {
            size.height = h;
        } else if let Some(dh) = self.double_height {
            size.height = if dh { 2 } else { 1 };
        }
        Some(size)
    }
}

/// Paper cut mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutMode {
    #[default]
    Full,
    Partial,
}

impl CutMode {
    /// `PART` (any case) is a partial cut; every other name cuts fully
    pub fn from_name(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("PART") {
            Self::Partial
        } else {
            Self::Full
        }
    }
}

/// QR error correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrErrorLevel {
    #[default]
    L,
    M,
    Q,
    H,
}

impl QrErrorLevel {
    /// 0 = L, 1 = M, 2 = Q, 3 = H
    pub fn from_index(ec: i64) -> PrintResult<Self> {
        match ec {
            0 => Ok(Self::L),
            1 => Ok(Self::M),
            2 => Ok(Self::Q),
            3 => Ok(Self::H),
            other => Err(PrintError::invalid(format!(
                "QR error correction must be 0-3, got {}",
                other
            ))),
        }
    }

    pub(crate) fn code(self) -> u8 {
        match self {
            Self::L => 48,
            Self::M => 49,
            Self::Q => 50,
            Self::H => 51,
        }
    }
}

/// QR symbol model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrModel {
    Model1,
    #[default]
    Model2,
    Micro,
}

impl QrModel {
    /// 1 = model 1, 2 = model 2, 3 = micro QR
    pub fn from_number(model: i64) -> PrintResult<Self> {
        match model {
            1 => Ok(Self::Model1),
            2 => Ok(Self::Model2),
            3 => Ok(Self::Micro),
            other => Err(PrintError::invalid(format!(
                "QR model must be 1, 2 or 3, got {}",
                other
            ))),
        }
    }

    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Model1 => 49,
            Self::Model2 => 50,
            Self::Micro => 51,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrOptions {
    /// Module size in dots, 1..=16
    pub size: u8,
    pub ec: QrErrorLevel,
    pub model: QrModel,
    /// Use the printer's QR engine instead of rendering an image
    pub native: bool,
    pub center: bool,
}

impl QrOptions {
    pub fn new(size: i64, ec: i64, model: i64, native: bool, center: bool) -> PrintResult<Self> {
        if !(1..=16).contains(&size) {
            return Err(PrintError::invalid(format!(
                "QR size must be between 1 and 16, got {}",
                size
            )));
        }
        let model = QrModel::from_number(model)?;
        if model == QrModel::Micro && !native {
            return Err(PrintError::invalid(
                "Micro QR is only available in native mode",
            ));
        }
        Ok(Self {
            size: size as u8,
            ec: QrErrorLevel::from_index(ec)?,
            model,
            native,
            center,
        })
    }
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            size: 3,
            ec: QrErrorLevel::L,
            model: QrModel::Model2,
            native: false,
            center: false,
        }
    }
}

/// Barcode symbology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    UpcA,
    UpcE,
    Ean13,
    Ean8,
    Code39,
    Itf,
    Codabar,
    Code93,
    Code128,
}

impl Symbology {
    pub fn parse(s: &str) -> PrintResult<Self> {
        let name: String = s
            .trim()
            .to_ascii_uppercase()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect();
        match name.as_str() {
            "UPCA" => Ok(Self::UpcA),
            "UPCE" => Ok(Self::UpcE),
            "EAN13" | "JAN13" => Ok(Self::Ean13),
            "EAN8" | "JAN8" => Ok(Self::Ean8),
            "CODE39" => Ok(Self::Code39),
            "ITF" => Ok(Self::Itf),
            "NW7" | "CODABAR" => Ok(Self::Codabar),
            "CODE93" => Ok(Self::Code93),
            "CODE128" => Ok(Self::Code128),
            _ => Err(PrintError::invalid(format!("Unknown barcode type: {}", s))),
        }
    }

    /// `m` for GS k function A, if the symbology has one
    pub(crate) fn function_a(self) -> Option<u8> {
        match self {
            Self::UpcA => Some(0),
            Self::UpcE => Some(1),
            Self::Ean13 => Some(2),
            Self::Ean8 => Some(3),
            Self::Code39 => Some(4),
            Self::Itf => Some(5),
            Self::Codabar => Some(6),
            Self::Code93 | Self::Code128 => None,
        }
    }

    /// `m` for GS k function B
    pub(crate) fn function_b(self) -> u8 {
        match self {
            Self::UpcA => 65,
            Self::UpcE => 66,
            Self::Ean13 => 67,
            Self::Ean8 => 68,
            Self::Code39 => 69,
            Self::Itf => 70,
            Self::Codabar => 71,
            Self::Code93 => 72,
            Self::Code128 => 73,
        }
    }
}

/// Which GS k command form to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarcodeFunction {
    A,
    B,
}

impl BarcodeFunction {
    pub fn parse(s: &str) -> PrintResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            other => Err(PrintError::invalid(format!(
                "Barcode function type must be A or B, got {}",
                other
            ))),
        }
    }
}

/// Human readable interpretation (HRI) placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HriPosition {
    Off,
    Above,
    #[default]
    Below,
    Both,
}

impl HriPosition {
    pub fn parse(s: &str) -> PrintResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OFF" => Ok(Self::Off),
            "ABOVE" => Ok(Self::Above),
            "BELOW" => Ok(Self::Below),
            "BOTH" => Ok(Self::Both),
            other => Err(PrintError::invalid(format!(
                "Barcode text position must be OFF, ABOVE, BELOW or BOTH, got {}",
                other
            ))),
        }
    }

    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Above => 1,
            Self::Below => 2,
            Self::Both => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarcodeOptions {
    pub symbology: Symbology,
    /// Bar height in dots, 1..=255
    pub height: u8,
    /// Module width, 2..=6
    pub width: u8,
    pub position: HriPosition,
    pub font: Font,
    pub align_center: bool,
    /// `None` picks function B
    pub function: Option<BarcodeFunction>,
    pub check: bool,
    pub force_software: bool,
}

impl BarcodeOptions {
    pub fn new(symbology: Symbology, height: i64, width: i64) -> PrintResult<Self> {
        if !(1..=255).contains(&height) {
            return Err(PrintError::invalid(format!(
                "Barcode height must be between 1 and 255, got {}",
                height
            )));
        }
        if !(2..=6).contains(&width) {
            return Err(PrintError::invalid(format!(
                "Barcode width must be between 2 and 6, got {}",
                width
            )));
        }
        Ok(Self {
            symbology,
            height: height as u8,
            width: width as u8,
            ..Self::default()
        })
    }
}

impl Default for BarcodeOptions {
    fn default() -> Self {
        Self {
            symbology: Symbology::Code128,
            height: 64,
            width: 3,
            position: HriPosition::Below,
            font: Font::A,
            align_center: true,
            function: None,
            check: true,
            force_software: false,
        }
    }
}

/// Image transfer command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageImpl {
    /// GS v 0
    #[default]
    BitImageRaster,
    /// GS ( L
    Graphics,
    /// ESC *
    BitImageColumn,
}

impl ImageImpl {
    pub fn parse(s: &str) -> PrintResult<Self> {
        match s.trim() {
            "bitImageRaster" => Ok(Self::BitImageRaster),
            "graphics" => Ok(Self::Graphics),
            "bitImageColumn" => Ok(Self::BitImageColumn),
            other => Err(PrintError::invalid(format!(
                "Unknown image implementation: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageOptions {
    pub high_density_vertical: bool,
    pub high_density_horizontal: bool,
    pub implementation: ImageImpl,
    /// Rows per transfer; tall images are sent in fragments
    pub fragment_height: u32,
    pub center: bool,
}

impl ImageOptions {
    pub fn with_fragment_height(mut self, rows: i64) -> PrintResult<Self> {
        if !(1..=0xFFFF).contains(&rows) {
            return Err(PrintError::invalid(format!(
                "Image fragment height must be between 1 and 65535, got {}",
                rows
            )));
        }
        self.fragment_height = rows as u32;
        Ok(self)
    }
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            high_density_vertical: true,
            high_density_horizontal: true,
            implementation: ImageImpl::BitImageRaster,
            fragment_height: 960,
            center: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_size_names() {
        assert_eq!(CharSize::parse("normal").unwrap(), CharSize::NORMAL);
        assert_eq!(CharSize::parse("2x").unwrap(), CharSize::new(2, 2).unwrap());
        assert_eq!(CharSize::parse("3x2").unwrap().code(), 0x21);
        assert!(CharSize::parse("9x1").is_err());
        assert!(CharSize::parse("huge").is_err());
    }

    #[test]
    fn test_symbology_aliases() {
        assert_eq!(Symbology::parse("upc-a").unwrap(), Symbology::UpcA);
        assert_eq!(Symbology::parse("JAN13").unwrap(), Symbology::Ean13);
        assert_eq!(Symbology::parse("nw7").unwrap(), Symbology::Codabar);
        assert!(Symbology::parse("PDF417").is_err());
    }

    #[test]
    fn test_cut_mode() {
        assert_eq!(CutMode::from_name("part"), CutMode::Partial);
        assert_eq!(CutMode::from_name("FULL"), CutMode::Full);
        assert_eq!(CutMode::from_name("anything"), CutMode::Full);
    }

    #[test]
    fn test_qr_options_bounds() {
        assert!(QrOptions::new(3, 0, 2, false, false).is_ok());
        assert!(QrOptions::new(0, 0, 2, false, false).is_err());
        assert!(QrOptions::new(3, 4, 2, false, false).is_err());
        assert!(QrOptions::new(3, 0, 3, false, false).is_err());
        assert!(QrOptions::new(3, 0, 3, true, false).is_ok());
    }

    #[test]
    fn test_style_size_resolution() {
        let style = TextStyle {
            height: Some(3),
            ..TextStyle::default()
        };
        let size = style.resolve_size(CharSize::new(2, 1).unwrap()).unwrap();
        assert_eq!((size.width, size.height), (2, 3));

        assert_eq!(TextStyle::with_bold(true).resolve_size(CharSize::NORMAL), None);
    }

    #[test]
    fn test_custom_size_false_ignores_width_and_height() {
        let style = TextStyle {
            width: Some(4),
            height: Some(4),
            custom_size: Some(false),
            double_height: Some(true),
            ..TextStyle::default()
        };
        let size = style.resolve_size(CharSize::NORMAL).unwrap();
        assert_eq!((size.width, size.height), (1, 2));

        let only_dims = TextStyle {
            width: Some(4),
            custom_size: Some(false),
            ..TextStyle::default()
        };
        assert_eq!(only_dims.resolve_size(CharSize::NORMAL), None);
    }
}
