//! Trace Source
//!
//! Read-only, pre-computed sample tables standing in for live telemetry.
//! One table per (feed, resolution), one column per metric. Lookups reduce
//! the index modulo the column length, so any tick maps to a valid row.

use std::collections::BTreeMap;

use crate::{
    Feed, Metric, Resolution, Result, TelemetryError, MINUTE_TRACK_LEN, WINDOW_CAPACITY,
};

/// Supplies trace tables to the window store and position tracker
pub trait TraceSource {
    fn table(&self, feed: Feed, resolution: Resolution) -> &TraceTable;
}

/// Column-oriented sample table for one feed at one resolution
#[derive(Debug, Clone, PartialEq)]
pub struct TraceTable {
    columns: BTreeMap<Metric, Vec<f64>>,
}

impl TraceTable {
    /// Every metric must be present with at least one full window of finite
    /// rows. Columns may differ in length (minute GPS tracks are longer than
    /// the scalar channels).
    pub fn new(columns: BTreeMap<Metric, Vec<f64>>) -> Result<Self> {
        for metric in Metric::ALL {
            let column = columns
                .get(&metric)
                .ok_or(TelemetryError::MissingColumn(metric))?;
            if column.len() < WINDOW_CAPACITY {
                return Err(TelemetryError::TraceTooShort {
                    metric,
                    len: column.len(),
                    min: WINDOW_CAPACITY,
                });
            }
            if let Some(row) = column.iter().position(|v| !v.is_finite()) {
                return Err(TelemetryError::NonFiniteSample { metric, row });
            }
        }
        Ok(Self { columns })
    }

    pub fn from_columns<I>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Metric, Vec<f64>)>,
    {
        Self::new(columns.into_iter().collect())
    }

    pub fn column(&self, metric: Metric) -> &[f64] {
        // Presence checked in `new`
        self.columns.get(&metric).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self, metric: Metric) -> usize {
        self.column(metric).len()
    }

    /// Row `index` of `metric`, wrapped to the column length
    pub fn sample(&self, metric: Metric, index: u64) -> f64 {
        let column = self.column(metric);
        if column.is_empty() {
            return 0.0;
        }
        column[(index % column.len() as u64) as usize]
    }

    /// First `WINDOW_CAPACITY` rows, used to seed windows
    pub fn head(&self, metric: Metric) -> &[f64] {
        let column = self.column(metric);
        &column[..WINDOW_CAPACITY.min(column.len())]
    }
}

/// Exact GPS track length per resolution; cursors wrap on these periods
pub fn gps_track_len(resolution: Resolution) -> usize {
    match resolution {
        Resolution::Minute => MINUTE_TRACK_LEN,
        Resolution::Hour => WINDOW_CAPACITY,
    }
}

/// Minute and hour tables for one feed
#[derive(Debug, Clone, PartialEq)]
pub struct FeedTraces {
    minute: TraceTable,
    hour: TraceTable,
}

impl FeedTraces {
    /// GPS columns must hold exactly [`gps_track_len`] rows
    pub fn new(minute: TraceTable, hour: TraceTable) -> Result<Self> {
        for (resolution, table) in [(Resolution::Minute, &minute), (Resolution::Hour, &hour)] {
            let expected = gps_track_len(resolution);
            for metric in Metric::GPS {
                let len = table.len(metric);
                if len != expected {
                    return Err(TelemetryError::TrackLength {
                        metric,
                        resolution,
                        len,
                        expected,
                    });
                }
            }
        }
        Ok(Self { minute, hour })
    }

    pub fn minute(&self) -> &TraceTable {
        &self.minute
    }

    pub fn hour(&self) -> &TraceTable {
        &self.hour
    }

    pub fn table(&self, resolution: Resolution) -> &TraceTable {
        match resolution {
            Resolution::Minute => &self.minute,
            Resolution::Hour => &self.hour,
        }
    }
}

/// In-memory trace source covering every feed
#[derive(Debug, Clone, PartialEq)]
pub struct TraceSet {
    feeds: [FeedTraces; 3],
}

impl TraceSet {
    pub fn new(default: FeedTraces, h45_k1: FeedTraces, l12_5: FeedTraces) -> Self {
        Self {
            feeds: [default, h45_k1, l12_5],
        }
    }

    pub fn feed(&self, feed: Feed) -> &FeedTraces {
        &self.feeds[feed.slot()]
    }
}

impl TraceSource for TraceSet {
    fn table(&self, feed: Feed, resolution: Resolution) -> &TraceTable {
        self.feed(feed).table(resolution)
    }
}
