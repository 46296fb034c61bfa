//! Metric and resolution identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TelemetryError;

/// Telemetry channel shown on the histogram.
///
/// Variant order is the selection priority: when several metrics are picked
/// within one resolve call, the earliest variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Elevation,
    Temperature,
    Speed,
    Latitude,
    Longitude,
    Fuel,
    Battery,
}

impl Metric {
    /// All metrics in selection priority order
    pub const ALL: [Metric; 7] = [
        Metric::Elevation,
        Metric::Temperature,
        Metric::Speed,
        Metric::Latitude,
        Metric::Longitude,
        Metric::Fuel,
        Metric::Battery,
    ];

    /// Scalar channels, replayed by rotation
    pub const SCALAR: [Metric; 5] = [
        Metric::Elevation,
        Metric::Temperature,
        Metric::Speed,
        Metric::Fuel,
        Metric::Battery,
    ];

    /// GPS channels, advanced from the trace
    pub const GPS: [Metric; 2] = [Metric::Latitude, Metric::Longitude];

    pub fn is_gps(&self) -> bool {
        matches!(self, Metric::Latitude | Metric::Longitude)
    }

    /// Position in [`Metric::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Elevation => "elevation",
            Metric::Temperature => "temperature",
            Metric::Speed => "speed",
            Metric::Latitude => "latitude",
            Metric::Longitude => "longitude",
            Metric::Fuel => "fuel",
            Metric::Battery => "battery",
        }
    }

    /// Capitalized name, e.g. "Fuel"
    pub fn label(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Histogram title, e.g. "Fuel Histogram"
    pub fn histogram_title(&self) -> String {
        format!("{} Histogram", self.label())
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TelemetryError::UnknownMetric(s.to_string()))
    }
}

/// Temporal granularity of a window
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    #[default]
    Minute,
    Hour,
}

impl Resolution {
    pub const ALL: [Resolution; 2] = [Resolution::Minute, Resolution::Hour];

    /// Mirror of the UI minute-mode toggle
    pub fn from_minute_toggle(minute_mode: bool) -> Self {
        if minute_mode {
            Resolution::Minute
        } else {
            Resolution::Hour
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Minute => "minute",
            Resolution::Hour => "hour",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minute" | "m" => Ok(Resolution::Minute),
            "hour" | "h" => Ok(Resolution::Hour),
            _ => Err(TelemetryError::UnknownResolution(s.to_string())),
        }
    }
}
