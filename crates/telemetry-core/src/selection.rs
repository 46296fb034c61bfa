//! Selection State Machine
//!
//! Decides which metric the histogram shows and at which resolution.
//!
//! Input arrives as typed [`SelectionCommand`]s. The legacy UI only exposes
//! monotonically increasing click counters; [`ClickCounters`] are diffed
//! against the last observed values and each increase becomes a
//! `MetricSelected` command. Commands wait in a priority queue and one is
//! applied per resolve, earliest [`Metric`] variant first. With nothing
//! pending the previous metric stays active.
//!
//! The y-axis policy is a pure function of (metric, resolution):
//!
//! | Metric | Minute | Hour |
//! |--------|--------|------|
//! | elevation | auto | 0..1000 |
//! | temperature | auto | 0..500 |
//! | speed | auto | 0..40 |
//! | latitude | auto | -90..90, dtick 30 |
//! | longitude | auto | 0..360 |
//! | fuel, battery | auto | 0..100 |

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::{Metric, Resolution};

/// Title shown before any metric has been picked
pub const NO_SELECTION_TITLE: &str = "Select A Property To Display";

// ============================================================================
// Y axis
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum YAxisDomain {
    Auto,
    Fixed {
        min: f64,
        max: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        dtick: Option<f64>,
    },
}

impl YAxisDomain {
    fn fixed(min: f64, max: f64) -> Self {
        YAxisDomain::Fixed {
            min,
            max,
            dtick: None,
        }
    }
}

pub fn y_axis_domain(metric: Metric, resolution: Resolution) -> YAxisDomain {
    if resolution == Resolution::Minute {
        return YAxisDomain::Auto;
    }
    match metric {
        Metric::Elevation => YAxisDomain::fixed(0.0, 1000.0),
        Metric::Temperature => YAxisDomain::fixed(0.0, 500.0),
        Metric::Speed => YAxisDomain::fixed(0.0, 40.0),
        Metric::Latitude => YAxisDomain::Fixed {
            min: -90.0,
            max: 90.0,
            dtick: Some(30.0),
        },
        Metric::Longitude => YAxisDomain::fixed(0.0, 360.0),
        Metric::Fuel | Metric::Battery => YAxisDomain::fixed(0.0, 100.0),
    }
}

// ============================================================================
// Descriptor
// ============================================================================

/// What the rendering layer should draw on the histogram panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayDescriptor {
    /// `None` means nothing has been picked yet
    pub active_metric: Option<Metric>,
    pub resolution: Resolution,
    pub y_axis: YAxisDomain,
    pub title: String,
}

impl DisplayDescriptor {
    pub fn new(active_metric: Option<Metric>, resolution: Resolution) -> Self {
        match active_metric {
            Some(metric) => Self {
                active_metric,
                resolution,
                y_axis: y_axis_domain(metric, resolution),
                title: metric.histogram_title(),
            },
            None => Self {
                active_metric: None,
                resolution,
                y_axis: YAxisDomain::Auto,
                title: NO_SELECTION_TITLE.to_string(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.active_metric.is_none()
    }
}

// ============================================================================
// Inputs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "metric")]
pub enum SelectionCommand {
    MetricSelected(Metric),
}

/// Per-metric click counters as reported by the UI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickCounters {
    pub elevation: u64,
    pub temperature: u64,
    pub speed: u64,
    pub latitude: u64,
    pub longitude: u64,
    pub fuel: u64,
    pub battery: u64,
}

impl ClickCounters {
    pub fn get(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Elevation => self.elevation,
            Metric::Temperature => self.temperature,
            Metric::Speed => self.speed,
            Metric::Latitude => self.latitude,
            Metric::Longitude => self.longitude,
            Metric::Fuel => self.fuel,
            Metric::Battery => self.battery,
        }
    }

    pub fn set(&mut self, metric: Metric, value: u64) {
        let slot = match metric {
            Metric::Elevation => &mut self.elevation,
            Metric::Temperature => &mut self.temperature,
            Metric::Speed => &mut self.speed,
            Metric::Latitude => &mut self.latitude,
            Metric::Longitude => &mut self.longitude,
            Metric::Fuel => &mut self.fuel,
            Metric::Battery => &mut self.battery,
        };
        *slot = value;
    }

    /// Builder form of `set`
    pub fn with(mut self, metric: Metric, value: u64) -> Self {
        self.set(metric, value);
        self
    }

    /// Counters in [`Metric::ALL`] order
    pub fn to_array(&self) -> [u64; 7] {
        Metric::ALL.map(|m| self.get(m))
    }

    pub fn from_array(values: [u64; 7]) -> Self {
        let mut counters = Self::default();
        for (metric, value) in Metric::ALL.into_iter().zip(values) {
            counters.set(metric, value);
        }
        counters
    }
}

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionState {
    /// Sticky across resolves with nothing pending
    pub active: Option<Metric>,
    pub resolution: Resolution,
    /// Last counter value seen per metric
    pub observed: ClickCounters,
    /// Selections not yet applied, ordered by priority
    pub pending: BTreeSet<Metric>,
}

impl SelectionState {
    /// Counter-driven resolve: diff `counters` against the observed values,
    /// apply the highest-priority change and return the new state. Metrics
    /// that changed but lost the tie-break stay pending for later calls.
    pub fn resolve(
        &self,
        counters: &ClickCounters,
        resolution: Resolution,
    ) -> (DisplayDescriptor, SelectionState) {
        let mut next = self.clone();
        next.observe(counters);
        let descriptor = next.settle(resolution);
        (descriptor, next)
    }

    pub fn descriptor(&self) -> DisplayDescriptor {
        DisplayDescriptor::new(self.active, self.resolution)
    }

    fn enqueue(&mut self, command: SelectionCommand) {
        match command {
            SelectionCommand::MetricSelected(metric) => {
                self.pending.insert(metric);
            }
        }
    }

    /// Increases become selections. Decreases and repeats select nothing;
    /// a decrease only lowers the observed value so later clicks register.
    fn observe(&mut self, counters: &ClickCounters) {
        for metric in Metric::ALL {
            let seen = self.observed.get(metric);
            let now = counters.get(metric);
            if now > seen {
                self.enqueue(SelectionCommand::MetricSelected(metric));
            }
            if now != seen {
                self.observed.set(metric, now);
            }
        }
    }

    fn settle(&mut self, resolution: Resolution) -> DisplayDescriptor {
        self.resolution = resolution;
        if let Some(metric) = self.pending.pop_first() {
            debug!("Selected {} ({} still pending)", metric, self.pending.len());
            self.active = Some(metric);
        }
        self.descriptor()
    }
}

/// Owns the selection state; the only writer of it
#[derive(Debug, Clone, Default)]
pub struct SelectionStateMachine {
    state: SelectionState,
}

impl SelectionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: SelectionState) -> Self {
        Self { state }
    }

    pub fn dispatch(&mut self, command: SelectionCommand) {
        self.state.enqueue(command);
    }

    /// Feed legacy click counters; increases are queued as selections
    pub fn observe_counters(&mut self, counters: &ClickCounters) {
        self.state.observe(counters);
    }

    /// Apply at most one pending selection and mirror `resolution`
    pub fn resolve(&mut self, resolution: Resolution) -> DisplayDescriptor {
        self.state.settle(resolution)
    }

    pub fn active(&self) -> Option<Metric> {
        self.state.active
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn descriptor(&self) -> DisplayDescriptor {
        self.state.descriptor()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn counters_strategy() -> impl Strategy<Value = ClickCounters> {
        prop::array::uniform7(0u64..5).prop_map(ClickCounters::from_array)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        // The winner is always the highest-priority increased counter
        #[test]
        fn fuzz_first_change_wins(counters in counters_strategy()) {
            let (d, _) = SelectionState::default().resolve(&counters, Resolution::Minute);
            let expected = Metric::ALL.into_iter().find(|m| counters.get(*m) > 0);
            prop_assert_eq!(d.active_metric, expected);
        }

        // Repeating the same counters never changes the active metric once drained
        #[test]
        fn fuzz_sticky_after_drain(counters in counters_strategy()) {
            let mut state = SelectionState::default();
            for _ in 0..8 {
                state = state.resolve(&counters, Resolution::Minute).1;
            }
            let active = state.active;
            let (d, _) = state.resolve(&counters, Resolution::Minute);
            prop_assert_eq!(d.active_metric, active);
        }
    }
}
