//! Device profiles
//!
//! A profile names a printer model and carries the hardware facts the driver
//! needs: printable width in dots, which bounds image and QR width and is
//! the span used for centering.
//!
//! | Profile | Width (dots) |
//! |---------|--------------|
//! | default | 512 |
//! | NT-80-V-UL | 576 |
//! | TM-T88V | 512 |
//! | TM-T20II | 576 |
//! | POS-5890 | 384 |

use crate::error::{PrintError, PrintResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceProfile {
    pub name: &'static str,
    pub width_dots: u32,
}

const PROFILES: &[DeviceProfile] = &[
    DeviceProfile {
        name: "default",
        width_dots: 512,
    },
    DeviceProfile {
        name: "NT-80-V-UL",
        width_dots: 576,
    },
    DeviceProfile {
        name: "TM-T88V",
        width_dots: 512,
    },
    DeviceProfile {
        name: "TM-T20II",
        width_dots: 576,
    },
    DeviceProfile {
        name: "POS-5890",
        width_dots: 384,
    },
];

impl DeviceProfile {
    /// Look up a profile by name (case-insensitive)
    pub fn by_name(name: &str) -> PrintResult<Self> {
        PROFILES
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
            .copied()
            .ok_or_else(|| PrintError::InvalidConfig(format!("Unknown device profile: {}", name)))
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        PROFILES[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let p = DeviceProfile::by_name("nt-80-v-ul").unwrap();
        assert_eq!(p.width_dots, 576);
    }

    #[test]
    fn test_unknown_profile() {
        assert!(matches!(
            DeviceProfile::by_name("TM-FAKE"),
            Err(PrintError::InvalidConfig(_))
        ));
    }
}
