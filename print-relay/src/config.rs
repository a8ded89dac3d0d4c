//! Service configuration
//!
//! Read from environment variables (a `.env` file is loaded first by the
//! binary):
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `PRINTER_IP` | `192.168.1.100` | printer used when a request names none |
//! | `PRINTER_PORT` | `9100` | printer port used when a request names none |
//! | `PRINTER_TIMEOUT_SECS` | `30` | connection timeout |
//! | `PRINTER_PROFILE` | `NT-80-V-UL` | device profile |
//! | `FETCH_TIMEOUT_SECS` | `10` | image download timeout |
//! | `HTTP_HOST` | `0.0.0.0` | REST bind address |
//! | `HTTP_PORT` | `8000` | REST port |
//! | `LOG_LEVEL` | `info` | log filter |
//! | `LOG_DIR` | - | daily log files are written here when the directory exists |

use std::time::Duration;

use crate::job::RunnerSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub printer_ip: String,
    pub printer_port: u16,
    pub printer_timeout_secs: u64,
    pub printer_profile: String,
    pub fetch_timeout_secs: u64,
    pub http_host: String,
    pub http_port: u16,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            printer_ip: std::env::var("PRINTER_IP").unwrap_or_else(|_| "192.168.1.100".into()),
            printer_port: std::env::var("PRINTER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(9100),
            printer_timeout_secs: std::env::var("PRINTER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            printer_profile: std::env::var("PRINTER_PROFILE")
                .unwrap_or_else(|_| "NT-80-V-UL".into()),
            fetch_timeout_secs: std::env::var("FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            http_host: std::env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
        }
    }

    /// Bind address for the REST server
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    pub fn printer_timeout(&self) -> Duration {
        Duration::from_secs(self.printer_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn runner_settings(&self) -> RunnerSettings {
        RunnerSettings {
            connect_timeout: self.printer_timeout(),
            profile: self.printer_profile.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            printer_ip: "192.168.1.100".into(),
            printer_port: 9100,
            printer_timeout_secs: 30,
            printer_profile: "NT-80-V-UL".into(),
            fetch_timeout_secs: 10,
            http_host: "0.0.0.0".into(),
            http_port: 8000,
            log_level: "info".into(),
            log_dir: None,
        }
    }
}
