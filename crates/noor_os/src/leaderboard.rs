#![forbid(unsafe_code)]

use std::sync::{Arc, Mutex, PoisonError, Weak};

use noor_engines::roster::RosterSource;
use noor_engines::{merge, project, LeaderboardProjection};
use noor_kernel_contracts::member::MemberProfile;
use noor_kernel_contracts::progress::PositionRecord;
use noor_kernel_contracts::ranking::VisibleWindow;
use noor_storage::keys::MY_ENTRY_KEY;
use noor_storage::{decode, KeyValueStore};
use tracing::{debug, warn};

use crate::notifier::{ChangeBus, Subscription, PROGRESS_TOPIC};

/// Read-merge-sort over the current store contents. Keeps no record between runs.
#[derive(Clone)]
pub struct LeaderboardPipeline {
    store: Arc<dyn KeyValueStore>,
    roster: Arc<dyn RosterSource>,
    viewer: Option<MemberProfile>,
}

impl LeaderboardPipeline {
    pub fn new(store: Arc<dyn KeyValueStore>, roster: Arc<dyn RosterSource>) -> Self {
        Self {
            store,
            roster,
            viewer: None,
        }
    }

    /// Signed-in member on this surface. A missing or unreadable snapshot both read as their
    /// starting record, so the member is always on the board.
    pub fn with_viewer(mut self, viewer: MemberProfile) -> Self {
        self.viewer = Some(viewer);
        self
    }

    pub fn viewer(&self) -> Option<&MemberProfile> {
        self.viewer.as_ref()
    }

    /// The "my entry" snapshot. Without a viewer, `None` when the device has not recorded
    /// progress yet.
    pub fn read_local(&self) -> Option<PositionRecord> {
        let raw = match self.store.get(MY_ENTRY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return self.viewer.as_ref().map(PositionRecord::starting_for),
            Err(err) => {
                warn!(error = %err, "my entry read failed");
                return self.viewer.as_ref().map(PositionRecord::starting_for);
            }
        };
        match decode(&raw) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(error = %err, "my entry unreadable");
                self.viewer.as_ref().map(PositionRecord::starting_for)
            }
        }
    }

    pub fn run(&self, window: VisibleWindow) -> LeaderboardProjection {
        let local = self.read_local();
        let roster = self.roster.roster();
        project(merge(local.as_ref(), &roster), window)
    }
}

struct ViewState {
    pipeline: LeaderboardPipeline,
    projection: LeaderboardProjection,
    renders: u64,
}

impl ViewState {
    fn rerender(&mut self) {
        let window = self.projection.window();
        self.projection = self.pipeline.run(window);
        self.renders += 1;
        debug!(
            renders = self.renders,
            total = self.projection.total(),
            "leaderboard view re-rendered"
        );
    }
}

/// A live leaderboard surface. It renders once on open and again on every progress signal
/// until dropped.
pub struct LeaderboardView {
    state: Arc<Mutex<ViewState>>,
    _subscription: Subscription,
}

impl LeaderboardView {
    pub fn open(bus: &ChangeBus, pipeline: LeaderboardPipeline, window: VisibleWindow) -> Self {
        let projection = pipeline.run(window);
        let state = Arc::new(Mutex::new(ViewState {
            pipeline,
            projection,
            renders: 1,
        }));
        let weak: Weak<Mutex<ViewState>> = Arc::downgrade(&state);
        let subscription = bus.subscribe(PROGRESS_TOPIC, move |_| {
            if let Some(state) = weak.upgrade() {
                state
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .rerender();
            }
        });
        Self {
            state,
            _subscription: subscription,
        }
    }

    /// Most recently rendered projection.
    pub fn projection(&self) -> LeaderboardProjection {
        self.lock().projection.clone()
    }

    /// Manual re-render.
    pub fn refresh(&self) {
        self.lock().rerender();
    }

    /// Changes how many entries are shown; order and data stay as rendered.
    pub fn set_window(&self, window: VisibleWindow) {
        let mut state = self.lock();
        let projection = state.projection.clone().with_window(window);
        state.projection = projection;
    }

    pub fn render_count(&self) -> u64 {
        self.lock().renders
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
