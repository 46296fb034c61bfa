//! Shared dashboard state and the tick scheduler
//!
//! The engine sits behind a single async mutex: every scheduler firing and
//! every UI event takes the lock, runs to completion, and releases it, so
//! ticks and events are applied one at a time in arrival order.
//!
//! Firings are numbered 1, 2, 3, ... on top of the engine's current tick,
//! which also keeps manual `/tick` calls and the interval on one sequence.

use std::sync::Arc;
use std::time::Duration;
use telemetry_core::{DashboardEngine, DashboardFrame, TraceSet, UiEvent, TICKS_PER_HOUR};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Frames buffered per WebSocket subscriber before it starts lagging
pub const FRAME_CHANNEL_CAPACITY: usize = 16;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<DashboardEngine<TraceSet>>>,
    pub frames: broadcast::Sender<DashboardFrame>,
}

impl AppState {
    pub fn new(engine: DashboardEngine<TraceSet>) -> Self {
        let (frames, _) = broadcast::channel(FRAME_CHANNEL_CAPACITY);
        Self {
            engine: Arc::new(Mutex::new(engine)),
            frames,
        }
    }

    /// Advance to the next tick, render, and publish the frame
    pub async fn advance(&self) -> DashboardFrame {
        let frame = {
            let mut engine = self.engine.lock().await;
            let next = engine.tick() + 1;
            engine.on_tick(next);
            engine.frame()
        };
        self.publish(&frame);
        frame
    }

    /// Apply a UI event and render the resulting frame
    pub async fn apply(&self, event: UiEvent) -> DashboardFrame {
        let mut engine = self.engine.lock().await;
        debug!("Applying UI event {:?}", event);
        engine.apply(event);
        engine.frame()
    }

    pub async fn frame(&self) -> DashboardFrame {
        self.engine.lock().await.frame()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardFrame> {
        self.frames.subscribe()
    }

    fn publish(&self, frame: &DashboardFrame) {
        // No subscribers is the normal state without open streams
        if let Ok(n) = self.frames.send(frame.clone()) {
            debug!("Tick {} frame sent to {} subscriber(s)", frame.tick, n);
        }
    }
}

/// Start the periodic tick task. The first firing happens one period after
/// start, so the dashboard shows the seeded tick-0 frame until then.
pub fn spawn_tick_scheduler(state: AppState, period: Duration) -> JoinHandle<()> {
    info!("Tick scheduler running every {:?}", period);
    tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let frame = state.advance().await;
            if frame.tick % TICKS_PER_HOUR == 0 {
                info!("Tick {} (hour windows rolled)", frame.tick);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetry_core::synthetic::{generate_trace_set, SyntheticConfig};
    use telemetry_core::{Metric, SatelliteId};

    fn state() -> AppState {
        let traces = generate_trace_set(&SyntheticConfig::default()).unwrap();
        AppState::new(DashboardEngine::new(Arc::new(traces)).unwrap())
    }

    #[tokio::test]
    async fn test_advance_numbers_ticks_from_one() {
        let state = state();
        assert_eq!(state.frame().await.tick, 0);
        assert_eq!(state.advance().await.tick, 1);
        assert_eq!(state.advance().await.tick, 2);
    }

    #[tokio::test]
    async fn test_advance_broadcasts_frame() {
        let state = state();
        let mut rx = state.subscribe();
        let sent = state.advance().await;
        let received = rx.recv().await.unwrap();
        assert_eq!(received.tick, sent.tick);
    }

    #[tokio::test]
    async fn test_apply_renders_selection() {
        let state = state();
        state
            .apply(UiEvent::SatelliteSelected {
                satellite: Some(SatelliteId::H45K1.key().to_string()),
            })
            .await;
        let frame = state.apply(UiEvent::MetricSelected { metric: Metric::Speed }).await;
        assert_eq!(frame.descriptor.active_metric, Some(Metric::Speed));
        assert_eq!(frame.satellite.index, Some(0));
    }

    #[tokio::test]
    async fn test_scheduler_fires_in_sequence() {
        let state = state();
        let mut rx = state.subscribe();
        let handle = spawn_tick_scheduler(state.clone(), Duration::from_millis(10));

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.tick, 1);
        assert_eq!(second.tick, 2);
        handle.abort();
    }
}
