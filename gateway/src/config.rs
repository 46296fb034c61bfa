//! Gateway configuration from environment variables
//!
//! | Variable | Default |
//! |----------|---------|
//! | `TELEMETRY_GATEWAY_PORT` / `PORT` | 18610 |
//! | `TELEMETRY_DATA_DIR` | `data/telemetry` |
//! | `TELEMETRY_TICK_MS` | 2000 |
//! | `TELEMETRY_SYNTHETIC_SEED` | 7 |

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 18610;
pub const DEFAULT_DATA_DIR: &str = "data/telemetry";
pub const DEFAULT_TICK_MS: u64 = 2000;
pub const DEFAULT_SYNTHETIC_SEED: u64 = 7;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub tick_interval: Duration,
    pub synthetic_seed: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            synthetic_seed: DEFAULT_SYNTHETIC_SEED,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable lookup; unset variables take their default
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port_var = ["TELEMETRY_GATEWAY_PORT", "PORT"]
            .into_iter()
            .find_map(|var| lookup(var).map(|raw| (var, raw)));
        let port = match port_var {
            Some((var, raw)) => parse_number(var, &raw)?,
            None => defaults.port,
        };

        let data_dir = lookup("TELEMETRY_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let tick_interval = match lookup("TELEMETRY_TICK_MS") {
            Some(raw) => {
                let ms: u64 = parse_number("TELEMETRY_TICK_MS", &raw)?;
                if ms == 0 {
                    return Err(ConfigError::InvalidNumber {
                        var: "TELEMETRY_TICK_MS",
                        value: raw,
                    });
                }
                Duration::from_millis(ms)
            }
            None => defaults.tick_interval,
        };

        let synthetic_seed = match lookup("TELEMETRY_SYNTHETIC_SEED") {
            Some(raw) => parse_number("TELEMETRY_SYNTHETIC_SEED", &raw)?,
            None => defaults.synthetic_seed,
        };

        Ok(Self {
            port,
            data_dir,
            tick_interval,
            synthetic_seed,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: raw.to_string(),
    })
}
