//! Barcode payload checks and software rendering

use barcoders::sym::codabar::Codabar;
use barcoders::sym::code39::Code39;
use barcoders::sym::code93::Code93;
use barcoders::sym::code128::Code128;
use barcoders::sym::ean8::EAN8;
use barcoders::sym::ean13::EAN13;
use barcoders::sym::tf::TF;

use crate::error::{PrintError, PrintResult};
use crate::types::Symbology;

const CODE39_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ -.$/+%*";
const CODABAR_CHARSET: &str = "0123456789-$:/.+ABCDabcd";

/// CODE128 payloads need a code set selector; `{B` covers printable ASCII
pub fn normalize(code: &str, symbology: Symbology) -> String {
    if symbology == Symbology::Code128 && !has_code_set(code) {
        format!("{{B{}", code)
    } else {
        code.to_string()
    }
}

fn has_code_set(code: &str) -> bool {
    code.starts_with("{A") || code.starts_with("{B") || code.starts_with("{C")
}

/// Check a (normalized) payload against the symbology's rules
pub fn validate(code: &str, symbology: Symbology) -> PrintResult<()> {
    let digits = !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit());
    let len = code.len();

    let ok = match symbology {
        Symbology::UpcA => digits && (11..=12).contains(&len),
        Symbology::UpcE => digits && ((6..=8).contains(&len) || (11..=12).contains(&len)),
        Symbology::Ean13 => digits && (12..=13).contains(&len),
        Symbology::Ean8 => digits && (7..=8).contains(&len),
        Symbology::Itf => digits && len >= 2 && len % 2 == 0,
        Symbology::Code39 => !code.is_empty() && code.chars().all(|c| CODE39_CHARSET.contains(c)),
        Symbology::Codabar => {
            len >= 2
                && code.chars().all(|c| CODABAR_CHARSET.contains(c))
                && is_codabar_guard(code.chars().next())
                && is_codabar_guard(code.chars().last())
        }
        Symbology::Code93 => !code.is_empty() && code.is_ascii(),
        Symbology::Code128 => has_code_set(code) && len > 2 && code.is_ascii(),
    };

    if ok {
        Ok(())
    } else {
        Err(PrintError::Barcode(format!(
            "'{}' is not a valid {:?} payload",
            code, symbology
        )))
    }
}

fn is_codabar_guard(c: Option<char>) -> bool {
    matches!(c, Some('A'..='D') | Some('a'..='d'))
}

/// Encode a (normalized) payload into bar modules with `barcoders`
pub fn software_modules(code: &str, symbology: Symbology) -> PrintResult<Vec<u8>> {
    let err = |e: barcoders::error::Error| {
        PrintError::Barcode(format!("Cannot encode '{}' as {:?}: {}", code, symbology, e))
    };

    match symbology {
        Symbology::Ean13 => Ok(EAN13::new(code).map_err(err)?.encode()),
        Symbology::Ean8 => Ok(EAN8::new(code).map_err(err)?.encode()),
        Symbology::Code39 => Ok(Code39::new(code).map_err(err)?.encode()),
        Symbology::Code93 => Ok(Code93::new(code).map_err(err)?.encode()),
        Symbology::Itf => Ok(TF::interleaved(code).map_err(err)?.encode()),
        Symbology::Codabar => Ok(Codabar::new(code).map_err(err)?.encode()),
        Symbology::Code128 => {
            // barcoders marks code sets with À (A), Ɓ (B), Ć (C)
            let (marker, rest) = match code.get(..2) {
                Some("{A") => ('\u{00C0}', &code[2..]),
                Some("{B") => ('\u{0181}', &code[2..]),
                Some("{C") => ('\u{0106}', &code[2..]),
                _ => ('\u{0181}', code),
            };
            Ok(Code128::new(format!("{}{}", marker, rest))
                .map_err(err)?
                .encode())
        }
        Symbology::UpcA | Symbology::UpcE => Err(PrintError::Barcode(format!(
            "{:?} has no software renderer",
            symbology
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code128_gets_code_set() {
        assert_eq!(normalize("12345", Symbology::Code128), "{B12345");
        assert_eq!(normalize("{C1234", Symbology::Code128), "{C1234");
        assert_eq!(normalize("12345", Symbology::Ean13), "12345");
    }

    #[test]
    fn test_validate() {
        assert!(validate("4006381333931", Symbology::Ean13).is_ok());
        assert!(validate("40063813339", Symbology::Ean13).is_err());
        assert!(validate("CODE 39", Symbology::Code39).is_ok());
        assert!(validate("code39", Symbology::Code39).is_err());
        assert!(validate("1234", Symbology::Itf).is_ok());
        assert!(validate("123", Symbology::Itf).is_err());
        assert!(validate("A1234B", Symbology::Codabar).is_ok());
        assert!(validate("{B123", Symbology::Code128).is_ok());
        assert!(validate("{B", Symbology::Code128).is_err());
    }

    #[test]
    fn test_software_code128() {
        let modules = software_modules("{BHello", Symbology::Code128).unwrap();
        assert!(!modules.is_empty());
        assert!(modules.iter().any(|m| *m == 1));
    }

    #[test]
    fn test_software_upc_unsupported() {
        assert!(software_modules("012345678905", Symbology::UpcA).is_err());
    }
}
