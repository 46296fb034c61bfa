//! Position Tracker
//!
//! Current-position marker and ground-track polyline for the selected feed.
//! The marker is the newest GPS pair in the minute window and is only drawn
//! on even ticks, so it flashes. The polyline is the whole minute GPS trace,
//! or nothing when the path toggle is off.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{Feed, Metric, Resolution, TraceSource, WindowSnapshot};

/// Points produced by [`interpolate_segment`]
pub const SEGMENT_POINTS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Marker state for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub lat: f64,
    pub lon: f64,
    pub visible: bool,
}

/// Marker is drawn on even ticks only
pub fn blink(tick: u64) -> bool {
    tick % 2 == 0
}

/// Straight segment from `from` towards `to`: `SEGMENT_POINTS` points,
/// starting at `from`, excluding `to`.
pub fn interpolate_segment(from: GeoPoint, to: GeoPoint) -> Vec<GeoPoint> {
    let step_lat = (to.lat - from.lat) / SEGMENT_POINTS as f64;
    let step_lon = (to.lon - from.lon) / SEGMENT_POINTS as f64;
    (0..SEGMENT_POINTS)
        .map(|i| {
            let i = i as f64;
            GeoPoint::new(from.lat + i * step_lat, from.lon + i * step_lon)
        })
        .collect()
}

pub struct PositionTracker<S> {
    source: Arc<S>,
}

impl<S: TraceSource> PositionTracker<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Newest GPS pair of a minute-resolution snapshot
    pub fn current_position(&self, minute_window: &WindowSnapshot) -> GeoPoint {
        debug_assert_eq!(minute_window.resolution, Resolution::Minute);
        let lat = minute_window
            .newest_coordinate(Metric::Latitude)
            .map(|c| c.degrees())
            .unwrap_or_default();
        let lon = minute_window
            .newest_coordinate(Metric::Longitude)
            .map(|c| c.degrees())
            .unwrap_or_default();
        GeoPoint::new(lat, lon)
    }

    /// Full minute ground track of `feed`; empty when hidden
    pub fn path(&self, feed: Feed, visible: bool) -> Vec<GeoPoint> {
        if !visible {
            return Vec::new();
        }
        let table = self.source.table(feed, Resolution::Minute);
        table
            .column(Metric::Latitude)
            .iter()
            .zip(table.column(Metric::Longitude))
            .map(|(&lat, &lon)| GeoPoint::new(lat, lon))
            .collect()
    }

    pub fn record(&self, minute_window: &WindowSnapshot, tick: u64) -> PositionRecord {
        let pos = self.current_position(minute_window);
        PositionRecord {
            lat: pos.lat,
            lon: pos.lon,
            visible: blink(tick),
        }
    }
}
