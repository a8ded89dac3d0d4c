//! Text encoding for thermal printers
//!
//! Text arrives as UTF-8 and is converted to the code page the job asked for
//! before it reaches the device. Labels follow the WHATWG encoding standard
//! (`utf-8`, `gbk`, `windows-1252`, `shift_jis`, ...).

use encoding_rs::{Encoding, UTF_8};
use tracing::warn;

/// Converts UTF-8 text into the byte encoding of a print job
#[derive(Debug, Clone, Copy)]
pub struct TextCodec {
    encoding: &'static Encoding,
}

impl TextCodec {
    /// Resolve a codec from an encoding label
    ///
    /// Unknown labels fall back to UTF-8 so a typo never blocks a job.
    pub fn for_label(label: &str) -> Self {
        match Encoding::for_label(label.trim().as_bytes()) {
            Some(encoding) => Self { encoding },
            None => {
                warn!(label = label, "Unknown text encoding, falling back to utf-8");
                Self::utf8()
            }
        }
    }

    /// Plain UTF-8 passthrough
    pub fn utf8() -> Self {
        Self { encoding: UTF_8 }
    }

    /// Canonical name of the resolved encoding
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Encode text, replacing unmappable characters with `?`
    pub fn encode(&self, text: &str) -> Vec<u8> {
        if self.encoding == UTF_8 {
            return text.as_bytes().to_vec();
        }

        let (bytes, _, had_errors) = self.encoding.encode(text);
        if !had_errors {
            return bytes.into_owned();
        }

        // encoding_rs emits HTML numeric references for unmappable chars,
        // which would print literally; encode char by char instead.
        let mut out = Vec::with_capacity(text.len());
        let mut buf = [0u8; 4];
        for c in text.chars() {
            let (bytes, _, bad) = self.encoding.encode(c.encode_utf8(&mut buf));
            if bad {
                out.push(b'?');
            } else {
                out.extend_from_slice(&bytes);
            }
        }
        out
    }
}

impl Default for TextCodec {
    fn default() -> Self {
        Self::utf8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_passthrough() {
        let codec = TextCodec::for_label("utf-8");
        assert_eq!(codec.encode("café"), "café".as_bytes());
    }

    #[test]
    fn test_gbk_is_double_byte() {
        let codec = TextCodec::for_label("gbk");
        assert_eq!(codec.encode("hello").len(), 5);
        assert_eq!(codec.encode("你好"), vec![0xC4, 0xE3, 0xBA, 0xC3]);
    }

    #[test]
    fn test_unknown_label_falls_back() {
        let codec = TextCodec::for_label("klingon");
        assert_eq!(codec.name(), "UTF-8");
    }

    #[test]
    fn test_unmappable_becomes_question_mark() {
        let codec = TextCodec::for_label("windows-1252");
        assert_eq!(codec.encode("a你b"), b"a?b");
        assert_eq!(codec.encode("é"), vec![0xE9]);
    }
}
