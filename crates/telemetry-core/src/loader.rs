//! Trace loading from the CSV dataset
//!
//! Expected layout (suffix `_0` = H45-K1, `_1` = L12-5, none = default feed):
//!
//! ```text
//! non_gps_data_m{suffix}.csv   elevation,temperature,speed,fuel,battery
//! non_gps_data_h{suffix}.csv   elevation,temperature,speed,fuel,battery
//! gps_data_m{suffix}.csv       lat,lon   (3600 rows)
//! gps_data_h{suffix}.csv       lat,lon   (60 rows)
//! ```
//!
//! Extra columns (e.g. a pandas index) are ignored.

use csv::Reader;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::{Feed, FeedTraces, Metric, Resolution, Result, TraceSet, TraceTable};

#[derive(Debug, Deserialize)]
struct ScalarRow {
    elevation: f64,
    temperature: f64,
    speed: f64,
    fuel: f64,
    battery: f64,
}

#[derive(Debug, Deserialize)]
struct GpsRow {
    lat: f64,
    lon: f64,
}

fn suffix(feed: Feed) -> &'static str {
    match feed {
        Feed::Default => "",
        Feed::H45K1 => "_0",
        Feed::L125 => "_1",
    }
}

fn resolution_tag(resolution: Resolution) -> &'static str {
    match resolution {
        Resolution::Minute => "m",
        Resolution::Hour => "h",
    }
}

fn scalar_path(dir: &Path, feed: Feed, resolution: Resolution) -> PathBuf {
    dir.join(format!(
        "non_gps_data_{}{}.csv",
        resolution_tag(resolution),
        suffix(feed)
    ))
}

fn gps_path(dir: &Path, feed: Feed, resolution: Resolution) -> PathBuf {
    dir.join(format!(
        "gps_data_{}{}.csv",
        resolution_tag(resolution),
        suffix(feed)
    ))
}

fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path)?;
    let mut reader = Reader::from_reader(BufReader::new(file));
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// True when all twelve dataset files exist under `dir`
pub fn dataset_present(dir: impl AsRef<Path>) -> bool {
    let dir = dir.as_ref();
    Feed::ALL.iter().all(|&feed| {
        Resolution::ALL.iter().all(|&resolution| {
            scalar_path(dir, feed, resolution).is_file() && gps_path(dir, feed, resolution).is_file()
        })
    })
}

pub fn load_table(dir: impl AsRef<Path>, feed: Feed, resolution: Resolution) -> Result<TraceTable> {
    let dir = dir.as_ref();
    let scalars: Vec<ScalarRow> = read_rows(&scalar_path(dir, feed, resolution))?;
    let gps: Vec<GpsRow> = read_rows(&gps_path(dir, feed, resolution))?;

    let mut columns: BTreeMap<Metric, Vec<f64>> = BTreeMap::new();
    columns.insert(Metric::Elevation, scalars.iter().map(|r| r.elevation).collect());
    columns.insert(Metric::Temperature, scalars.iter().map(|r| r.temperature).collect());
    columns.insert(Metric::Speed, scalars.iter().map(|r| r.speed).collect());
    columns.insert(Metric::Fuel, scalars.iter().map(|r| r.fuel).collect());
    columns.insert(Metric::Battery, scalars.iter().map(|r| r.battery).collect());
    columns.insert(Metric::Latitude, gps.iter().map(|r| r.lat).collect());
    columns.insert(Metric::Longitude, gps.iter().map(|r| r.lon).collect());

    TraceTable::new(columns)
}

pub fn load_feed(dir: impl AsRef<Path>, feed: Feed) -> Result<FeedTraces> {
    let dir = dir.as_ref();
    FeedTraces::new(
        load_table(dir, feed, Resolution::Minute)?,
        load_table(dir, feed, Resolution::Hour)?,
    )
}

/// Load every feed from `dir`
pub fn load_trace_set(dir: impl AsRef<Path>) -> Result<TraceSet> {
    let dir = dir.as_ref();
    info!("Loading telemetry traces from {:?}", dir);

    let set = TraceSet::new(
        load_feed(dir, Feed::Default)?,
        load_feed(dir, Feed::H45K1)?,
        load_feed(dir, Feed::L125)?,
    );

    info!(
        "Loaded traces: {} minute GPS rows (default feed)",
        set.feed(Feed::Default).minute().len(Metric::Latitude)
    );
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TelemetryError, TraceSource, WINDOW_CAPACITY};
    use std::io::Write;
    use tempfile::TempDir;

    fn write_dataset(dir: &Path, gps_minute_rows: usize, scalar_rows: usize) {
        for feed in Feed::ALL {
            for resolution in Resolution::ALL {
                let mut f = File::create(scalar_path(dir, feed, resolution)).unwrap();
                writeln!(f, ",elevation,temperature,speed,fuel,battery").unwrap();
                for i in 0..scalar_rows {
                    writeln!(f, "{},{},{},{},{},{}", i, 500 + i, 250, 20, 90, 80).unwrap();
                }

                let rows = match resolution {
                    Resolution::Minute => gps_minute_rows,
                    Resolution::Hour => WINDOW_CAPACITY,
                };
                let mut f = File::create(gps_path(dir, feed, resolution)).unwrap();
                writeln!(f, "lat,lon").unwrap();
                for i in 0..rows {
                    writeln!(f, "{},{}", -45.0 + i as f64 * 0.01, i as f64 * 0.1).unwrap();
                }
            }
        }
    }

    #[test]
    fn test_load_dataset() {
        let tmp = TempDir::new().unwrap();
        write_dataset(tmp.path(), 3600, 60);

        assert!(dataset_present(tmp.path()));
        let set = load_trace_set(tmp.path()).unwrap();

        let minute = set.table(Feed::L125, Resolution::Minute);
        assert_eq!(minute.len(Metric::Latitude), 3600);
        assert_eq!(minute.len(Metric::Elevation), 60);
        assert_eq!(minute.sample(Metric::Elevation, 3), 503.0);
        assert_eq!(minute.sample(Metric::Latitude, 0), -45.0);
    }

    #[test]
    fn test_missing_files() {
        let tmp = TempDir::new().unwrap();
        assert!(!dataset_present(tmp.path()));
        assert!(matches!(
            load_trace_set(tmp.path()),
            Err(TelemetryError::Io(_))
        ));
    }

    #[test]
    fn test_overlong_minute_track_rejected() {
        let tmp = TempDir::new().unwrap();
        write_dataset(tmp.path(), 3601, 60);

        assert!(dataset_present(tmp.path()));
        assert!(matches!(
            load_trace_set(tmp.path()),
            Err(TelemetryError::TrackLength {
                resolution: Resolution::Minute,
                len: 3601,
                expected: 3600,
                ..
            })
        ));
    }

    #[test]
    fn test_non_finite_sample_rejected() {
        let tmp = TempDir::new().unwrap();
        write_dataset(tmp.path(), 3600, 60);
        let path = gps_path(tmp.path(), Feed::H45K1, Resolution::Hour);
        let mut f = File::create(path).unwrap();
        writeln!(f, "lat,lon").unwrap();
        for i in 0..WINDOW_CAPACITY {
            let lat = if i == 5 { "NaN".to_string() } else { i.to_string() };
            writeln!(f, "{},{}", lat, i).unwrap();
        }

        assert!(matches!(
            load_trace_set(tmp.path()),
            Err(TelemetryError::NonFiniteSample { metric: Metric::Latitude, row: 5 })
        ));
    }

    #[test]
    fn test_short_dataset_rejected() {
        let tmp = TempDir::new().unwrap();
        write_dataset(tmp.path(), 3600, 30);
        assert!(matches!(
            load_trace_set(tmp.path()),
            Err(TelemetryError::TraceTooShort { .. })
        ));
    }
}
