//! Satellite Telemetry Core
//!
//! Stateful engine behind the live satellite dashboard:
//! - Fixed-capacity sliding windows rolled forward at minute and hour resolution
//! - Metric selection state machine (typed commands or legacy click counters)
//! - Ground-track position tracker with a blinking current-position marker
//!
//! # Tick Cadence
//!
//! | Resolution | Advances on | GPS cursor |
//! |------------|-------------|------------|
//! | Minute | every tick | `(60 + tick) mod len` |
//! | Hour | `tick mod 60 == 0` | `tick mod len` |
//!
//! Everything is single-writer and synchronous: a tick or UI event runs to
//! completion before the next one is applied.

use thiserror::Error;

pub mod catalog;
pub mod engine;
pub mod loader;
pub mod metric;
pub mod position;
pub mod readout;
pub mod selection;
pub mod synthetic;
pub mod trace;
pub mod window;

pub use catalog::{Feed, SatelliteId, SatelliteInfo};
pub use engine::{ControlState, DashboardEngine, DashboardFrame, UiEvent};
pub use metric::{Metric, Resolution};
pub use position::{interpolate_segment, GeoPoint, PositionRecord, PositionTracker};
pub use readout::{GaugeReadout, GpsReadout, Readouts};
pub use selection::{
    y_axis_domain, ClickCounters, DisplayDescriptor, SelectionCommand, SelectionState,
    SelectionStateMachine, YAxisDomain,
};
pub use trace::{FeedTraces, TraceSet, TraceSource, TraceTable};
pub use window::{FixedCoordinate, Series, WindowBuffer, WindowSnapshot, WindowStore};

/// Every window holds exactly this many samples
pub const WINDOW_CAPACITY: usize = 60;

/// Hour windows advance once per this many ticks
pub const TICKS_PER_HOUR: u64 = 60;

/// Minute GPS cursor starts past the seeded prefix
pub const MINUTE_GPS_OFFSET: u64 = 60;

/// Length of a full minute-resolution ground track
pub const MINUTE_TRACK_LEN: usize = 3600;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Trace column {metric} has {len} rows, need at least {min}")]
    TraceTooShort {
        metric: Metric,
        len: usize,
        min: usize,
    },
    #[error("Trace table is missing column {0}")]
    MissingColumn(Metric),
    #[error("{resolution} {metric} track has {len} rows, expected exactly {expected}")]
    TrackLength {
        metric: Metric,
        resolution: Resolution,
        len: usize,
        expected: usize,
    },
    #[error("Trace column {metric} has a non-finite sample at row {row}")]
    NonFiniteSample { metric: Metric, row: usize },
    #[error("Window must hold exactly {expected} samples, got {len}")]
    InvalidWindow { expected: usize, len: usize },
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
    #[error("Unknown resolution: {0}")]
    UnknownResolution(String),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
