//! Print commands
//!
//! A job is a list of JSON objects such as `{"text": "Hello\n"}` or
//! `{"qr": "https://example.com, size=4"}`. Each entry becomes a
//! [`PrintCommand`] (name plus loosely typed value), which [`Command::parse`]
//! turns into a typed driver operation with every default applied.
//!
//! | Name | Value | Default when the value has another type |
//! |------|-------|-----------------------------------------|
//! | `text` | any, rendered as text | - |
//! | `lf` | ignored | - |
//! | `feed` | lines | `1` |
//! | `cut` | `PART` or `FULL` | `PART` |
//! | `cashdraw` | pin 2 or 5 | `2` |
//! | `hw` | `INIT`, `SELECT`, `RESET` | - |
//! | `control` | `LF`, `FF`, `CR`, `HT`, `VT` | - |
//! | `set` | formatting object | not an object: nothing happens |
//! | `set_font`, `font` | `a`/`b` | - |
//! | `set_align`, `set_justification`, `align` | `left`/`center`/`right` | - |
//! | `set_bold`, `bold` | truthiness | - |
//! | `set_underline`, `underline` | 0, 1, 2 or boolean | `1` |
//! | `set_size`, `size` | size name | `normal` |
//! | `set_height`, `set_width` | magnification 1..=8 | `1` |
//! | `set_line_spacing` | dots | `30` |
//! | `set_barcode_height` | dots | `50` |
//! | `set_barcode_width` | module width | `2` |
//! | `qr` | content or compound string | - |
//! | `barcode` | payload or compound string | - |
//! | `image` | URL, path or compound string | - |

use std::path::PathBuf;

use crab_printer::{
    Alignment, BarcodeFunction, BarcodeOptions, CharSize, CutMode, Font, HriPosition, ImageImpl,
    ImageOptions, PrintError, QrOptions, Symbology, TextStyle, Underline,
};
use serde::Deserialize;
use serde_json::Value;

use crate::coerce;
use crate::error::DispatchError;
use crate::params::{ParameterMap, SEPARATOR};

/// One entry of the job's command list, as received
pub type CommandMap = serde_json::Map<String, Value>;

/// A single operation name with its raw value
#[derive(Debug, Clone, PartialEq)]
pub struct PrintCommand {
    pub name: String,
    pub value: Value,
}

impl PrintCommand {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Split a command object into its entries, in document order
    pub fn from_map(map: &CommandMap) -> Vec<Self> {
        map.iter()
            .map(|(name, value)| Self::new(name.clone(), value.clone()))
            .collect()
    }

    /// Lower-cased operation name
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// A compound `image` string is the last entry of its object that runs
    pub fn ends_mapping(&self) -> bool {
        self.key() == "image"
            && self
                .value
                .as_str()
                .is_some_and(|s| !is_url(s) && s.contains(SEPARATOR))
    }
}

/// Where an image comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Downloaded into a temporary file for the duration of the command
    Url(String),
    /// Local file; `options` is set when given as a compound string
    File {
        path: PathBuf,
        options: Option<ImageOptions>,
    },
}

/// A recognized command with typed arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Text(String),
    Lf,
    Feed(i64),
    Cut(CutMode),
    Cashdraw(i64),
    Hw(String),
    Control(String),
    Style(TextStyle),
    /// `set` with a value that is not an object
    Ignored,
    LineSpacing(i64),
    BarcodeHeight(i64),
    BarcodeWidth(i64),
    Qr {
        content: String,
        options: QrOptions,
    },
    Barcode {
        code: String,
        options: BarcodeOptions,
    },
    Image(ImageSource),
}

impl Command {
    /// Type a command; `Ok(None)` when the name is not recognized
    pub fn parse(command: &PrintCommand) -> Result<Option<Self>, DispatchError> {
        let value = &command.value;
        let parsed = match command.key().as_str() {
            "text" => Self::Text(coerce::display_string(value)),
            "lf" => Self::Lf,
            "feed" => Self::Feed(coerce::int_or(value, 1)),
            "cut" => Self::Cut(CutMode::from_name(&coerce::string_or(value, "PART"))),
            "cashdraw" => Self::Cashdraw(coerce::int_or(value, 2)),
            "hw" => Self::Hw(coerce::display_string(value)),
            "control" => Self::Control(coerce::display_string(value)),
            "set" => match value {
                Value::Object(_) => Self::Style(parse_style(value)?),
                _ => Self::Ignored,
            },
            "set_font" | "font" => {
                Self::Style(TextStyle::with_font(Font::parse(&coerce::display_string(value))?))
            }
            "set_align" | "set_justification" | "align" => Self::Style(TextStyle::with_align(
                Alignment::parse(&coerce::display_string(value))?,
            )),
            "set_bold" | "bold" => Self::Style(TextStyle::with_bold(coerce::truthy(value))),
            "set_underline" | "underline" => Self::Style(TextStyle::with_underline(
                Underline::from_level(coerce::level_or(value, 1))?,
            )),
            "set_size" | "size" => Self::Style(TextStyle::with_size(CharSize::parse(
                &coerce::string_or(value, "normal"),
            )?)),
            "set_height" => Self::Style(TextStyle {
                height: Some(CharSize::new(1, coerce::int_or(value, 1))?.height),
                ..TextStyle::default()
            }),
            "set_width" => Self::Style(TextStyle {
                width: Some(CharSize::new(coerce::int_or(value, 1), 1)?.width),
                ..TextStyle::default()
            }),
            "set_line_spacing" => Self::LineSpacing(coerce::int_or(value, 30)),
            "set_barcode_height" => Self::BarcodeHeight(coerce::int_or(value, 50)),
            "set_barcode_width" => Self::BarcodeWidth(coerce::int_or(value, 2)),
            "qr" => parse_qr(value)?,
            "barcode" => parse_barcode(value)?,
            "image" => Self::Image(parse_image(value)?),
            _ => return Ok(None),
        };
        Ok(Some(parsed))
    }
}

fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Compound parameters, when the value is a string containing the separator
fn compound(value: &Value) -> Option<ParameterMap> {
    value
        .as_str()
        .filter(|s| s.contains(SEPARATOR))
        .map(ParameterMap::parse)
}

fn parse_qr(value: &Value) -> Result<Command, DispatchError> {
    let Some(params) = compound(value) else {
        return Ok(Command::Qr {
            content: coerce::display_string(value),
            options: QrOptions::default(),
        });
    };

    let options = QrOptions::new(
        params.int_in("size", 3, 1, 16)?,
        params.int_in("ec", 0, 0, 3)?,
        params.int_in("model", 2, 1, 3)?,
        params.bool_or("native", false)?,
        params.bool_or("center", false)?,
    )?;
    Ok(Command::Qr {
        content: params.content(),
        options,
    })
}

fn parse_barcode(value: &Value) -> Result<Command, DispatchError> {
    let Some(params) = compound(value) else {
        return Ok(Command::Barcode {
            code: coerce::display_string(value),
            options: BarcodeOptions::default(),
        });
    };

    let mut options = BarcodeOptions::new(
        Symbology::parse(&params.str_or("bc", "CODE128")?)?,
        params.int_in("height", 64, 1, 255)?,
        params.int_in("width", 3, 2, 6)?,
    )?;
    options.position = HriPosition::parse(&params.str_or("pos", "BELOW")?)?;
    options.font = Font::parse(&params.str_or("font", "A")?)?;
    options.align_center = params.bool_or("align_ct", true)?;
    options.function = params
        .opt_str("function_type")?
        .map(|f| BarcodeFunction::parse(&f))
        .transpose()?;
    options.check = params.bool_or("check", true)?;
    options.force_software = params.bool_or("force_software", false)?;

    Ok(Command::Barcode {
        code: params.content(),
        options,
    })
}

fn parse_image(value: &Value) -> Result<ImageSource, DispatchError> {
    let Value::String(s) = value else {
        return Ok(ImageSource::File {
            path: PathBuf::from(coerce::display_string(value)),
            options: None,
        });
    };

    if is_url(s) {
        return Ok(ImageSource::Url(s.clone()));
    }
    let Some(params) = compound(value) else {
        return Ok(ImageSource::File {
            path: PathBuf::from(s),
            options: None,
        });
    };

    let options = ImageOptions {
        high_density_vertical: params.bool_or("high_density_vertical", true)?,
        high_density_horizontal: params.bool_or("high_density_horizontal", true)?,
        implementation: ImageImpl::parse(&params.str_or("impl", "bitImageRaster")?)?,
        center: params.bool_or("center", false)?,
        ..ImageOptions::default()
    }
    .with_fragment_height(params.int_in("fragment_height", 960, 1, 65535)?)?;

    Ok(ImageSource::File {
        path: PathBuf::from(params.content()),
        options: Some(options),
    })
}

/// Scalar accepted by `set` for options that take a name or a number
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Str(String),
}

/// The `set` formatting object
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StyleSpec {
    align: Option<String>,
    font: Option<Scalar>,
    bold: Option<bool>,
    underline: Option<Scalar>,
    size: Option<String>,
    width: Option<i64>,
    height: Option<i64>,
    custom_size: Option<bool>,
    density: Option<i64>,
    double_width: Option<bool>,
    double_height: Option<bool>,
    normal_textsize: Option<bool>,
    invert: Option<bool>,
    flip: Option<bool>,
    smooth: Option<bool>,
}

impl StyleSpec {
    fn into_style(self) -> Result<TextStyle, PrintError> {
        let font = match self.font {
            None => None,
            Some(Scalar::Str(s)) => Some(Font::parse(&s)?),
            Some(Scalar::Int(n)) => Some(Font::parse(&n.to_string())?),
            Some(Scalar::Bool(_)) => {
                return Err(PrintError::InvalidArgument(
                    "font must be a name or an index".to_string(),
                ));
            }
        };
        let underline = match self.underline {
            None => None,
            Some(Scalar::Bool(b)) => Some(Underline::from_level(b as i64)?),
            Some(Scalar::Int(n)) => Some(Underline::from_level(n)?),
            Some(Scalar::Str(s)) => {
                let level = s.trim().parse::<i64>().map_err(|_| {
                    PrintError::InvalidArgument(format!("Unknown underline mode: {}", s))
                })?;
                Some(Underline::from_level(level)?)
            }
        };

        let density = match self.density {
            None => None,
            Some(d @ 0..=8) => Some(d as u8),
            Some(other) => {
                return Err(PrintError::InvalidArgument(format!(
                    "Density must be between 0 and 8, got {}",
                    other
                )));
            }
        };

        Ok(TextStyle {
            align: self.align.as_deref().map(Alignment::parse).transpose()?,
            font,
            bold: self.bold,
            underline,
            size: self.size.as_deref().map(CharSize::parse).transpose()?,
            width: self
                .width
                .map(|w| CharSize::new(w, 1).map(|s| s.width))
                .transpose()?,
            height: self
                .height
                .map(|h| CharSize::new(1, h).map(|s| s.height))
                .transpose()?,
            custom_size: self.custom_size,
            double_width: self.double_width,
            double_height: self.double_height,
            normal_textsize: self.normal_textsize,
            invert: self.invert,
            flip: self.flip,
            smooth: self.smooth,
            density,
        })
    }
}

fn parse_style(value: &Value) -> Result<TextStyle, DispatchError> {
    let spec: StyleSpec =
        serde_json::from_value(value.clone()).map_err(|e| DispatchError::Style(e.to_string()))?;
    spec.into_style()
        .map_err(|e| DispatchError::Style(e.to_string()))
}
