//! Control-panel readouts derived from the minute window of the selected feed

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FixedCoordinate, Metric, WindowSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaugeReadout {
    pub metric: Metric,
    pub value: f64,
}

/// Seven-segment style GPS display. The sign is shown as a flag, not a
/// character, so a leading '-' is replaced by '0'.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsReadout {
    pub metric: Metric,
    pub digits: String,
    pub negative: bool,
}

impl GpsReadout {
    pub fn new(metric: Metric, coordinate: &FixedCoordinate) -> Self {
        let raw = coordinate.as_str();
        let digits = match raw.strip_prefix('-') {
            Some(rest) => format!("0{}", rest),
            None => raw.to_string(),
        };
        Self {
            metric,
            digits,
            negative: coordinate.is_negative(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readouts {
    pub gauges: Vec<GaugeReadout>,
    pub gps: Vec<GpsReadout>,
    pub communication_signal: bool,
    pub utc_clock: String,
}

impl Readouts {
    pub fn from_window(minute_window: &WindowSnapshot, tick: u64, now: DateTime<Utc>) -> Self {
        let gauges = Metric::SCALAR
            .iter()
            .filter_map(|&metric| {
                minute_window
                    .newest_scalar(metric)
                    .map(|value| GaugeReadout { metric, value })
            })
            .collect();

        let gps = Metric::GPS
            .iter()
            .filter_map(|&metric| {
                minute_window
                    .newest_coordinate(metric)
                    .map(|c| GpsReadout::new(metric, c))
            })
            .collect();

        Self {
            gauges,
            gps,
            communication_signal: communication_signal(tick),
            utc_clock: utc_clock(now),
        }
    }

    pub fn gauge(&self, metric: Metric) -> Option<f64> {
        self.gauges.iter().find(|g| g.metric == metric).map(|g| g.value)
    }
}

/// Signal lamp is lit on odd ticks, opposite phase to the position marker
pub fn communication_signal(tick: u64) -> bool {
    tick % 2 == 1
}

pub fn utc_clock(now: DateTime<Utc>) -> String {
    now.format("%H:%M").to_string()
}
