//! Lazy, single-flight construction of the external overlay.
//!
//! ```text
//! Idle --begin--> Loading --ready--> Ready
//!                    |
//!                    +--failed / timed out--> Idle
//! ```
//!
//! The load runs as a spawned task; its outcome comes back over a channel
//! and is only applied when the owner calls [`ResourceLifecycle::poll`], so
//! all state changes happen on the owner's thread.

use crate::core::config::OverlayOptions;
use crate::overlay::{load_overlay, AssetUrls, OverlayBackend, OverlayMap};
use crate::runtime::{self, AsyncHandle};
use crate::{BasemapError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use instant::Instant;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Idle,
    Loading,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleTransition {
    /// The overlay fired its load event and is now usable
    Ready,
    Failed(String),
    TimedOut,
}

enum Phase {
    Idle,
    Loading {
        generation: u64,
        started: Instant,
        task: Box<dyn AsyncHandle>,
    },
    Ready(Box<dyn OverlayMap>),
}

struct LoadOutcome {
    generation: u64,
    result: Result<Box<dyn OverlayMap>>,
}

pub struct ResourceLifecycle {
    phase: Phase,
    /// Bumped per attempt so outcomes of abandoned attempts can be told apart
    generation: u64,
    timeout: Option<Duration>,
    tx: Sender<LoadOutcome>,
    rx: Receiver<LoadOutcome>,
    construction_requests: u64,
    last_error: Option<String>,
}

impl ResourceLifecycle {
    pub fn new(timeout: Option<Duration>) -> Self {
        let (tx, rx) = unbounded();
        Self {
            phase: Phase::Idle,
            generation: 0,
            timeout,
            tx,
            rx,
            construction_requests: 0,
            last_error: None,
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        match self.phase {
            Phase::Idle => LifecyclePhase::Idle,
            Phase::Loading { .. } => LifecyclePhase::Loading,
            Phase::Ready(_) => LifecyclePhase::Ready,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading { .. })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.phase, Phase::Ready(_))
    }

    /// The overlay, once it has fired its load event
    pub fn overlay_mut(&mut self) -> Option<&mut dyn OverlayMap> {
        match &mut self.phase {
            Phase::Ready(overlay) => Some(overlay.as_mut()),
            _ => None,
        }
    }

    /// How many load attempts have been started
    pub fn construction_requests(&self) -> u64 {
        self.construction_requests
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Starts loading the overlay unless a load is in flight or the overlay
    /// already exists. Returns whether a new attempt was started.
    pub fn begin(
        &mut self,
        backend: &OverlayBackend,
        urls: AssetUrls,
        options: OverlayOptions,
    ) -> bool {
        match self.phase {
            Phase::Idle => {}
            Phase::Loading { generation, .. } => {
                log::debug!("overlay load {} already in flight", generation);
                return false;
            }
            Phase::Ready(_) => {
                log::debug!("overlay already constructed");
                return false;
            }
        }

        self.generation += 1;
        self.construction_requests += 1;
        let generation = self.generation;
        log::info!("loading overlay (attempt {}) with style {}", generation, options.style_url);

        let tx = self.tx.clone();
        let load = load_overlay(backend.assets.clone(), backend.factory.clone(), urls, options);
        let task = runtime::spawn(backend.spawner.as_ref(), async move {
            let result = load.await;
            let _ = tx.send(LoadOutcome { generation, result });
        });

        self.phase = Phase::Loading {
            generation,
            started: Instant::now(),
            task,
        };
        true
    }

    /// Applies finished loads and enforces the load timeout
    pub fn poll(&mut self) -> Option<LifecycleTransition> {
        let mut transition = None;

        while let Ok(outcome) = self.rx.try_recv() {
            let current = matches!(
                self.phase,
                Phase::Loading { generation, .. } if generation == outcome.generation
            );
            if !current {
                log::debug!("dropping outcome of abandoned overlay load {}", outcome.generation);
                continue;
            }
            match outcome.result {
                Ok(overlay) => {
                    log::info!("overlay ready");
                    self.phase = Phase::Ready(overlay);
                    self.last_error = None;
                    transition = Some(LifecycleTransition::Ready);
                }
                Err(e) => {
                    let message = e.to_string();
                    log::warn!("overlay load failed: {}", message);
                    self.phase = Phase::Idle;
                    self.last_error = Some(message.clone());
                    transition = Some(LifecycleTransition::Failed(message));
                }
            }
        }

        let expired = match (&self.phase, self.timeout) {
            (Phase::Loading { started, task, .. }, Some(timeout))
                if started.elapsed() >= timeout =>
            {
                task.cancel();
                Some(timeout)
            }
            _ => None,
        };
        if let Some(timeout) = expired {
            let message = BasemapError::Timeout(timeout).to_string();
            log::warn!("{}", message);
            self.phase = Phase::Idle;
            self.last_error = Some(message);
            transition = Some(LifecycleTransition::TimedOut);
        }

        transition
    }
}

impl std::fmt::Debug for ResourceLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceLifecycle")
            .field("phase", &self.phase())
            .field("generation", &self.generation)
            .field("timeout", &self.timeout)
            .field("construction_requests", &self.construction_requests)
            .field("last_error", &self.last_error)
            .finish()
    }
}
