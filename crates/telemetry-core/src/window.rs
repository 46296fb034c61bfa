//! Window Store
//!
//! Fixed-capacity sliding windows per feed, resolution and metric.
//!
//! Per advance:
//! - GPS metrics append the trace sample under the cursor, formatted to a
//!   fixed 4-decimal string, and evict the oldest entry.
//! - Scalar metrics do not read the trace. The oldest buffered value is
//!   moved to the newest slot (left rotation), so the window replays the
//!   same 60 values cyclically.
//!
//! Minute windows advance on every tick, hour windows only when
//! `tick mod 60 == 0`. Length is exactly [`WINDOW_CAPACITY`] at all times.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::{
    Feed, Metric, Resolution, Result, TelemetryError, TraceSource, TraceTable, MINUTE_GPS_OFFSET,
    MINUTE_TRACK_LEN, TICKS_PER_HOUR, WINDOW_CAPACITY,
};

// ============================================================================
// Cursor arithmetic
// ============================================================================

/// Minute GPS row for `tick`: `(60 + tick) mod 3600`
pub fn minute_gps_cursor(tick: u64) -> u64 {
    let len = MINUTE_TRACK_LEN as u64;
    (tick % len + MINUTE_GPS_OFFSET) % len
}

/// Hour GPS row for `tick`: `tick mod 60`
pub fn hour_gps_cursor(tick: u64) -> u64 {
    tick % WINDOW_CAPACITY as u64
}

/// Hour windows roll only on these ticks
pub fn is_hour_boundary(tick: u64) -> bool {
    tick % TICKS_PER_HOUR == 0
}

// ============================================================================
// Fixed coordinate
// ============================================================================

/// Degrees rendered as `{:09.4}`: 4 decimals, zero padded to 9 chars with the
/// sign kept in front (`-012.3456`, `0005.1000`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixedCoordinate(String);

impl FixedCoordinate {
    pub fn from_degrees(degrees: f64) -> Self {
        Self(format!("{:09.4}", degrees))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trace tables only hold finite samples, so the rendered string always
    /// parses; 0.0 is returned only for hand-built coordinates that don't.
    pub fn degrees(&self) -> f64 {
        self.0.parse().unwrap_or(0.0)
    }

    pub fn is_negative(&self) -> bool {
        self.0.starts_with('-')
    }
}

impl fmt::Display for FixedCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Window buffer
// ============================================================================

/// FIFO window that always holds exactly [`WINDOW_CAPACITY`] samples
#[derive(Debug, Clone, PartialEq)]
pub struct WindowBuffer<T> {
    samples: VecDeque<T>,
}

impl<T: Clone> WindowBuffer<T> {
    pub fn new(samples: Vec<T>) -> Result<Self> {
        if samples.len() != WINDOW_CAPACITY {
            return Err(TelemetryError::InvalidWindow {
                expected: WINDOW_CAPACITY,
                len: samples.len(),
            });
        }
        Ok(Self {
            samples: samples.into(),
        })
    }

    /// Append newest, evict oldest
    pub fn push(&mut self, value: T) {
        self.samples.push_back(value);
        while self.samples.len() > WINDOW_CAPACITY {
            self.samples.pop_front();
        }
    }

    /// Move the oldest sample to the newest slot
    pub fn rotate(&mut self) {
        self.samples.rotate_left(1);
    }

    pub fn oldest(&self) -> Option<&T> {
        self.samples.front()
    }

    pub fn newest(&self) -> Option<&T> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.samples.iter()
    }

    /// Oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.samples.iter().cloned().collect()
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// One metric's window, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Series {
    Scalar(Vec<f64>),
    Coordinate(Vec<FixedCoordinate>),
}

impl Series {
    pub fn len(&self) -> usize {
        match self {
            Series::Scalar(v) => v.len(),
            Series::Coordinate(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric view, oldest first
    pub fn values(&self) -> Vec<f64> {
        match self {
            Series::Scalar(v) => v.clone(),
            Series::Coordinate(v) => v.iter().map(FixedCoordinate::degrees).collect(),
        }
    }
}

/// Immutable copy of every metric window for one feed at one resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub feed: Feed,
    pub resolution: Resolution,
    pub series: BTreeMap<Metric, Series>,
}

impl WindowSnapshot {
    pub fn series(&self, metric: Metric) -> Option<&Series> {
        self.series.get(&metric)
    }

    pub fn scalar(&self, metric: Metric) -> Option<&[f64]> {
        match self.series.get(&metric)? {
            Series::Scalar(v) => Some(v),
            Series::Coordinate(_) => None,
        }
    }

    pub fn coordinates(&self, metric: Metric) -> Option<&[FixedCoordinate]> {
        match self.series.get(&metric)? {
            Series::Coordinate(v) => Some(v),
            Series::Scalar(_) => None,
        }
    }

    pub fn newest_scalar(&self, metric: Metric) -> Option<f64> {
        self.scalar(metric)?.last().copied()
    }

    pub fn newest_coordinate(&self, metric: Metric) -> Option<&FixedCoordinate> {
        self.coordinates(metric)?.last()
    }

    /// Newest first, the order the histogram plots it
    pub fn display_values(&self, metric: Metric) -> Vec<f64> {
        let mut values = self.series(metric).map(Series::values).unwrap_or_default();
        values.reverse();
        values
    }
}

// ============================================================================
// Per-feed windows
// ============================================================================

#[derive(Debug, Clone)]
struct MetricWindows {
    scalars: BTreeMap<Metric, WindowBuffer<f64>>,
    coordinates: BTreeMap<Metric, WindowBuffer<FixedCoordinate>>,
}

impl MetricWindows {
    fn seed(table: &TraceTable) -> Result<Self> {
        let mut scalars = BTreeMap::new();
        for metric in Metric::SCALAR {
            scalars.insert(metric, WindowBuffer::new(table.head(metric).to_vec())?);
        }

        let mut coordinates = BTreeMap::new();
        for metric in Metric::GPS {
            let formatted = table
                .head(metric)
                .iter()
                .map(|&deg| FixedCoordinate::from_degrees(deg))
                .collect();
            coordinates.insert(metric, WindowBuffer::new(formatted)?);
        }

        Ok(Self {
            scalars,
            coordinates,
        })
    }

    fn roll(&mut self, table: &TraceTable, row: u64) {
        // TODO: decide whether scalar channels should ingest fresh trace rows
        // instead of replaying; see DESIGN.md "Rotation vs progression".
        for window in self.scalars.values_mut() {
            window.rotate();
        }

        for (metric, window) in self.coordinates.iter_mut() {
            window.push(FixedCoordinate::from_degrees(table.sample(*metric, row)));
        }
    }

    fn snapshot(&self, feed: Feed, resolution: Resolution) -> WindowSnapshot {
        let mut series = BTreeMap::new();
        for (metric, window) in &self.scalars {
            series.insert(*metric, Series::Scalar(window.to_vec()));
        }
        for (metric, window) in &self.coordinates {
            series.insert(*metric, Series::Coordinate(window.to_vec()));
        }
        WindowSnapshot {
            feed,
            resolution,
            series,
        }
    }

    fn lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.scalars
            .values()
            .map(WindowBuffer::len)
            .chain(self.coordinates.values().map(WindowBuffer::len))
    }
}

#[derive(Debug, Clone)]
struct FeedWindows {
    minute: MetricWindows,
    hour: MetricWindows,
}

impl FeedWindows {
    fn seed<S: TraceSource>(source: &S, feed: Feed) -> Result<Self> {
        Ok(Self {
            minute: MetricWindows::seed(source.table(feed, Resolution::Minute))?,
            hour: MetricWindows::seed(source.table(feed, Resolution::Hour))?,
        })
    }

    fn resolution(&self, resolution: Resolution) -> &MetricWindows {
        match resolution {
            Resolution::Minute => &self.minute,
            Resolution::Hour => &self.hour,
        }
    }
}

// ============================================================================
// Store
// ============================================================================

/// Owns every window; mutated only by [`WindowStore::advance`]
pub struct WindowStore<S> {
    source: Arc<S>,
    feeds: [FeedWindows; 3],
}

impl<S: TraceSource> WindowStore<S> {
    /// Seed each window from the first 60 rows of its trace
    pub fn new(source: Arc<S>) -> Result<Self> {
        let feeds = [
            FeedWindows::seed(source.as_ref(), Feed::Default)?,
            FeedWindows::seed(source.as_ref(), Feed::H45K1)?,
            FeedWindows::seed(source.as_ref(), Feed::L125)?,
        ];
        Ok(Self { source, feeds })
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Roll the windows of one feed forward for `tick`
    pub fn advance(&mut self, tick: u64, feed: Feed) {
        let source = self.source.as_ref();
        let windows = &mut self.feeds[feed.slot()];

        windows
            .minute
            .roll(source.table(feed, Resolution::Minute), minute_gps_cursor(tick));

        let hour_due = is_hour_boundary(tick);
        if hour_due {
            windows
                .hour
                .roll(source.table(feed, Resolution::Hour), hour_gps_cursor(tick));
        }

        debug!("Advanced {} windows to tick {} (hour roll: {})", feed, tick, hour_due);
    }

    pub fn snapshot(&self, feed: Feed, resolution: Resolution) -> WindowSnapshot {
        self.feeds[feed.slot()]
            .resolution(resolution)
            .snapshot(feed, resolution)
    }

    /// True when every window of every feed holds exactly `WINDOW_CAPACITY`
    pub fn is_full(&self) -> bool {
        self.feeds.iter().all(|f| {
            f.minute
                .lengths()
                .chain(f.hour.lengths())
                .all(|len| len == WINDOW_CAPACITY)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{generate_trace_set, SyntheticConfig};
    use crate::{FeedTraces, TraceSet, MINUTE_TRACK_LEN};

    /// Ramp traces: row i of every column holds `base + i`
    fn ramp_set() -> TraceSet {
        let table = |gps_len: usize, base: f64| {
            TraceTable::from_columns(Metric::ALL.map(|m| {
                let len = if m.is_gps() { gps_len } else { WINDOW_CAPACITY };
                (m, (0..len).map(|i| base + i as f64).collect())
            }))
            .unwrap()
        };
        let feed = |base: f64| {
            FeedTraces::new(table(MINUTE_TRACK_LEN, base), table(WINDOW_CAPACITY, base)).unwrap()
        };
        TraceSet::new(feed(0.0), feed(1000.0), feed(2000.0))
    }

    fn store() -> WindowStore<TraceSet> {
        WindowStore::new(Arc::new(ramp_set())).unwrap()
    }

    #[test]
    fn test_fixed_coordinate_format() {
        assert_eq!(FixedCoordinate::from_degrees(-12.3456).as_str(), "-012.3456");
        assert_eq!(FixedCoordinate::from_degrees(5.1).as_str(), "0005.1000");
        assert_eq!(FixedCoordinate::from_degrees(123.45678).as_str(), "0123.4568");
        assert_eq!(FixedCoordinate::from_degrees(-0.5).as_str(), "-000.5000");
        assert!((FixedCoordinate::from_degrees(-45.25).degrees() + 45.25).abs() < 1e-9);
        assert!(FixedCoordinate::from_degrees(-1.0).is_negative());
    }

    #[test]
    fn test_buffer_rejects_wrong_length() {
        assert!(WindowBuffer::new(vec![0.0; 59]).is_err());
        assert!(WindowBuffer::new(vec![0.0; 61]).is_err());
        assert!(WindowBuffer::new(vec![0.0; WINDOW_CAPACITY]).is_ok());
    }

    #[test]
    fn test_buffer_push_and_rotate() {
        let mut buf = WindowBuffer::new((0..60).collect::<Vec<i32>>()).unwrap();
        buf.push(100);
        assert_eq!(buf.len(), 60);
        assert_eq!(buf.oldest(), Some(&1));
        assert_eq!(buf.newest(), Some(&100));

        buf.rotate();
        assert_eq!(buf.len(), 60);
        assert_eq!(buf.oldest(), Some(&2));
        assert_eq!(buf.newest(), Some(&1));
    }

    #[test]
    fn test_cursor_arithmetic() {
        assert_eq!(minute_gps_cursor(0), 60);
        assert_eq!(minute_gps_cursor(3539), 3599);
        assert_eq!(minute_gps_cursor(3540), 0);
        assert_eq!(minute_gps_cursor(u64::MAX), (u64::MAX % 3600 + 60) % 3600);
        assert_eq!(hour_gps_cursor(61), 1);
        assert!(is_hour_boundary(0));
        assert!(is_hour_boundary(120));
        assert!(!is_hour_boundary(59));
    }

    #[test]
    fn test_seeded_from_trace_head() {
        let store = store();
        let snap = store.snapshot(Feed::H45K1, Resolution::Minute);
        assert_eq!(snap.scalar(Metric::Fuel).unwrap()[0], 1000.0);
        assert_eq!(snap.newest_scalar(Metric::Fuel), Some(1059.0));
        assert_eq!(
            snap.newest_coordinate(Metric::Latitude).unwrap().as_str(),
            "1059.0000"
        );
        assert!(store.is_full());
    }

    #[test]
    fn test_minute_gps_progresses() {
        let mut store = store();
        store.advance(1, Feed::H45K1);

        let snap = store.snapshot(Feed::H45K1, Resolution::Minute);
        let lat = snap.coordinates(Metric::Latitude).unwrap();
        assert_eq!(lat.len(), WINDOW_CAPACITY);
        // (60 + 1) mod 3600 = 61
        assert_eq!(lat.last().unwrap().degrees(), 1061.0);
        assert_eq!(lat[0].degrees(), 1001.0);
    }

    #[test]
    fn test_scalar_rotates() {
        let mut store = store();
        let before = store.snapshot(Feed::L125, Resolution::Minute);
        store.advance(1, Feed::L125);
        let after = store.snapshot(Feed::L125, Resolution::Minute);

        for metric in Metric::SCALAR {
            let mut expected = before.scalar(metric).unwrap().to_vec();
            expected.rotate_left(1);
            assert_eq!(after.scalar(metric).unwrap(), expected.as_slice());
        }
    }

    #[test]
    fn test_hour_rolls_only_on_boundary() {
        let mut store = store();
        let seeded = store.snapshot(Feed::H45K1, Resolution::Hour);

        for tick in 1..60 {
            store.advance(tick, Feed::H45K1);
        }
        assert_eq!(store.snapshot(Feed::H45K1, Resolution::Hour), seeded);

        store.advance(60, Feed::H45K1);
        let rolled = store.snapshot(Feed::H45K1, Resolution::Hour);
        assert_ne!(rolled, seeded);
        // 60 mod 60 = row 0
        assert_eq!(
            rolled.newest_coordinate(Metric::Longitude).unwrap().degrees(),
            1000.0
        );
        assert_eq!(rolled.newest_scalar(Metric::Speed), Some(1000.0));
    }

    #[test]
    fn test_feeds_are_independent() {
        let mut store = store();
        let other = store.snapshot(Feed::L125, Resolution::Minute);
        store.advance(1, Feed::H45K1);
        assert_eq!(store.snapshot(Feed::L125, Resolution::Minute), other);
    }

    #[test]
    fn test_gps_wraps_after_full_track() {
        let mut store = store();
        for tick in 1..=MINUTE_TRACK_LEN as u64 {
            store.advance(tick, Feed::Default);
        }
        let snap = store.snapshot(Feed::Default, Resolution::Minute);
        // Last cursor: (60 + 3600) mod 3600 = 60, same as tick 0
        assert_eq!(snap.newest_coordinate(Metric::Latitude).unwrap().degrees(), 60.0);
    }

    #[test]
    fn test_minute_cursor_wraps_to_row_zero() {
        let mut store = store();
        store.advance(3540, Feed::H45K1);
        let snap = store.snapshot(Feed::H45K1, Resolution::Minute);
        // (60 + 3540) mod 3600 = 0
        assert_eq!(snap.newest_coordinate(Metric::Latitude).unwrap().degrees(), 1000.0);
    }

    #[test]
    fn test_display_values_newest_first() {
        let store = store();
        let snap = store.snapshot(Feed::Default, Resolution::Minute);
        let values = snap.display_values(Metric::Battery);
        assert_eq!(values.first(), Some(&59.0));
        assert_eq!(values.last(), Some(&0.0));
    }

    #[test]
    fn test_synthetic_source_seeds() {
        let set = generate_trace_set(&SyntheticConfig::default()).unwrap();
        let store = WindowStore::new(Arc::new(set)).unwrap();
        assert!(store.is_full());
    }
}
