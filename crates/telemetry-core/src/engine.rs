//! Dashboard Engine
//!
//! Wires the window store, selection state machine and position tracker to
//! the two input streams:
//! - ticks from the scheduler (`on_tick`)
//! - UI events (`apply`)
//!
//! Both are applied synchronously through `&mut self`, so a tick can never
//! interleave with an event. `frame` resolves the selection and renders
//! everything the dashboard shows for the current tick.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    ClickCounters, DisplayDescriptor, Feed, GeoPoint, Metric, PositionRecord, PositionTracker,
    Readouts, Resolution, Result, SatelliteId, SatelliteInfo, SelectionCommand,
    SelectionStateMachine, TraceSource, WindowSnapshot, WindowStore,
};

/// Operator input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// Dropdown key (`h45-k1`, `l12-5`); `None` or unknown keys clear it
    SatelliteSelected { satellite: Option<String> },
    MetricSelected { metric: Metric },
    ResolutionToggled { minute_mode: bool },
    PathToggled { visible: bool },
    /// Raw button counters from clients that cannot send typed selections
    ClickCounters { counters: ClickCounters },
}

/// UI toggles mirrored by the engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    pub satellite: Option<SatelliteId>,
    pub resolution: Resolution,
    pub path_visible: bool,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            satellite: None,
            resolution: Resolution::Minute,
            path_visible: true,
        }
    }
}

impl ControlState {
    pub fn feed(&self) -> Feed {
        Feed::from(self.satellite)
    }
}

/// Everything the rendering layer needs for one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardFrame {
    pub tick: u64,
    pub feed: Feed,
    pub satellite: SatelliteInfo,
    pub descriptor: DisplayDescriptor,
    /// Active metric window, newest first; empty with no selection
    pub histogram: Vec<f64>,
    pub position: PositionRecord,
    pub path: Vec<GeoPoint>,
    pub readouts: Readouts,
}

pub struct DashboardEngine<S> {
    windows: WindowStore<S>,
    selection: SelectionStateMachine,
    tracker: PositionTracker<S>,
    controls: ControlState,
    tick: u64,
    last_tick: Option<u64>,
}

impl<S: TraceSource> DashboardEngine<S> {
    /// Windows are seeded and the engine sits at tick 0 until the first firing
    pub fn new(source: Arc<S>) -> Result<Self> {
        let windows = WindowStore::new(Arc::clone(&source))?;
        let tracker = PositionTracker::new(source);
        info!("Dashboard engine seeded for {} feeds", Feed::ALL.len());

        Ok(Self {
            windows,
            selection: SelectionStateMachine::new(),
            tracker,
            controls: ControlState::default(),
            tick: 0,
            last_tick: None,
        })
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn controls(&self) -> &ControlState {
        &self.controls
    }

    pub fn selection(&self) -> &SelectionStateMachine {
        &self.selection
    }

    pub fn windows(&self) -> &WindowStore<S> {
        &self.windows
    }

    /// Advance every satellite's windows, H45-K1 before L12-5.
    /// The default feed keeps its seeded windows. Returns false when the
    /// tick is not newer than the last one applied.
    pub fn on_tick(&mut self, tick: u64) -> bool {
        if let Some(last) = self.last_tick {
            if tick <= last {
                warn!("Ignoring stale tick {} (last applied {})", tick, last);
                return false;
            }
        }

        for sat in SatelliteId::ALL {
            self.windows.advance(tick, Feed::from(sat));
        }
        self.tick = tick;
        self.last_tick = Some(tick);
        debug!("Tick {} applied", tick);
        true
    }

    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::SatelliteSelected { satellite } => {
                let selected = satellite.as_deref().and_then(SatelliteId::from_key);
                if let (Some(key), None) = (satellite.as_deref(), selected) {
                    warn!("Unknown satellite '{}', showing default feed", key);
                }
                self.controls.satellite = selected;
            }
            UiEvent::MetricSelected { metric } => {
                self.selection.dispatch(SelectionCommand::MetricSelected(metric));
            }
            UiEvent::ResolutionToggled { minute_mode } => {
                self.controls.resolution = Resolution::from_minute_toggle(minute_mode);
            }
            UiEvent::PathToggled { visible } => {
                self.controls.path_visible = visible;
            }
            UiEvent::ClickCounters { counters } => {
                self.selection.observe_counters(&counters);
            }
        }
    }

    pub fn snapshot(&self, feed: Feed, resolution: Resolution) -> WindowSnapshot {
        self.windows.snapshot(feed, resolution)
    }

    pub fn frame(&mut self) -> DashboardFrame {
        self.frame_at(Utc::now())
    }

    /// Resolve the selection and render the current tick
    pub fn frame_at(&mut self, now: DateTime<Utc>) -> DashboardFrame {
        let feed = self.controls.feed();
        let descriptor = self.selection.resolve(self.controls.resolution);

        let histogram = match descriptor.active_metric {
            Some(metric) => self
                .windows
                .snapshot(feed, descriptor.resolution)
                .display_values(metric),
            None => Vec::new(),
        };

        let minute_window = self.windows.snapshot(feed, Resolution::Minute);

        DashboardFrame {
            tick: self.tick,
            feed,
            satellite: SatelliteInfo::for_selection(self.controls.satellite),
            descriptor,
            histogram,
            position: self.tracker.record(&minute_window, self.tick),
            path: self.tracker.path(feed, self.controls.path_visible),
            readouts: Readouts::from_window(&minute_window, self.tick, now),
        }
    }
}
