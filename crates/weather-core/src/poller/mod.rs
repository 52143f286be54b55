//! Fetch-and-update poller
//!
//! The Poller drives the Synchronizer: one cycle at startup, then one cycle
//! every configured interval until stopped.
//!
//! ## Cycle
//!
//! ```text
//!   Idle ──► Fetching ──► Updating ──► Idle
//!             │  current conditions (may fail)
//!             │  forecast           (may fail independently)
//!             ▼
//!        WeatherSnapshot ──► Synchronizer ──► devices / GatewayHost
//! ```
//!
//! A failed section is logged and skipped; the previous property values stay
//! authoritative and the next scheduled cycle runs normally. There is no
//! retry backoff.
//!
//! ## Timing
//!
//! The loop wakes once per second. A tick counter triggers a cycle once it
//! exceeds the interval, then resets. `stop()` is observed at the next
//! one-second boundary and never interrupts a cycle in progress.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::WeatherConfig;
use crate::device::Devices;
use crate::error::Result;
use crate::snapshot::WeatherSnapshot;
use crate::sync::{SyncReport, Synchronizer};
use crate::traits::{GatewayHost, WeatherSource};

/// Wall-clock granularity of the poll loop
const TICK: Duration = Duration::from_secs(1);

/// Capacity of the poller event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Upstream document a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Current,
    Forecast,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Section::Current => f.write_str("current conditions"),
            Section::Forecast => f.write_str("forecast"),
        }
    }
}

/// Events emitted by the Poller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollerEvent {
    /// Poll loop started
    Started { location_id: u32 },

    /// A fetch-and-update cycle began
    CycleStarted { cycle: u64 },

    /// One section of the cycle could not be fetched or decoded
    SectionFailed { section: Section, error: String },

    /// A cycle finished; `changed` counts host notifications it caused
    CycleCompleted { cycle: u64, changed: usize },

    /// Poll loop exited
    Stopped { reason: String },
}

/// Where the poller is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Fetching,
    Updating,
}

/// Cancellation handle for a running Poller
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    /// Ask the poller to exit at its next one-second boundary
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Weather poller
///
/// Owns both devices for the process lifetime.
///
/// ## Lifecycle
///
/// 1. Create with [`Poller::new()`]; both devices are registered with the host
/// 2. Keep a [`StopHandle`] from [`Poller::stop_handle()`]
/// 3. Run with [`Poller::run()`] until stopped
pub struct Poller {
    source: Box<dyn WeatherSource>,
    synchronizer: Synchronizer,
    devices: Devices,
    config: WeatherConfig,
    running: Arc<AtomicBool>,
    state: PollerState,
    cycles: u64,
    event_tx: mpsc::Sender<PollerEvent>,
}

impl Poller {
    /// Create a poller and register its devices with the host
    ///
    /// # Returns
    ///
    /// A tuple of (poller, event_receiver) where event_receiver yields poller events
    pub fn new(
        source: Box<dyn WeatherSource>,
        host: Arc<dyn GatewayHost>,
        config: WeatherConfig,
    ) -> Result<(Self, mpsc::Receiver<PollerEvent>)> {
        config.validate()?;

        let devices = Devices::new();
        devices.register(host.as_ref());

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let poller = Self {
            source,
            synchronizer: Synchronizer::new(config.clone(), host),
            devices,
            config,
            running: Arc::new(AtomicBool::new(true)),
            state: PollerState::Idle,
            cycles: 0,
            event_tx: tx,
        };

        Ok((poller, rx))
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// Equivalent to `stop_handle().stop()`
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn devices(&self) -> &Devices {
        &self.devices
    }

    pub fn config(&self) -> &WeatherConfig {
        &self.config
    }

    /// Number of cycles run so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run the poll loop until stopped
    ///
    /// Performs one cycle immediately, then one every interval.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            "Polling {} for city {} every {:?}",
            self.source.source_name(),
            self.config.location_id,
            self.config.poll_interval()
        );
        self.emit_event(PollerEvent::Started {
            location_id: self.config.location_id,
        });

        self.run_cycle().await;

        let interval_secs = self.config.poll_interval_secs;
        let mut ticks: u64 = 0;

        while self.running.load(Ordering::SeqCst) {
            if ticks > interval_secs {
                ticks = 0;
                debug!("Grabbing fresh weather data after {}s", interval_secs);
                self.run_cycle().await;
            }

            ticks += 1;
            tokio::time::sleep(TICK).await;
        }

        info!("Poller stopped after {} cycle(s)", self.cycles);
        self.emit_event(PollerEvent::Stopped {
            reason: "Stop requested".to_string(),
        });

        Ok(())
    }

    /// Perform exactly one fetch-and-update cycle
    ///
    /// Never fails: a section that cannot be fetched or decoded is logged and
    /// left out of the snapshot.
    pub async fn run_cycle(&mut self) -> SyncReport {
        self.cycles += 1;
        let cycle = self.cycles;
        self.emit_event(PollerEvent::CycleStarted { cycle });

        self.state = PollerState::Fetching;

        let current = match self.source.current_conditions().await {
            Ok(report) => Some(report),
            Err(e) => {
                self.section_failed(Section::Current, &e);
                None
            }
        };

        let forecast = match self.source.forecast(self.config.location_id).await {
            Ok(report) => Some(report),
            Err(e) => {
                self.section_failed(Section::Forecast, &e);
                None
            }
        };

        self.state = PollerState::Updating;

        let snapshot = WeatherSnapshot::new(current, forecast);
        let report = self.synchronizer.apply(&mut self.devices, &snapshot);

        self.state = PollerState::Idle;

        debug!(
            "Cycle {} complete: {} created, {} updated, {} unchanged, {} skipped",
            cycle, report.created, report.updated, report.unchanged, report.skipped
        );
        self.emit_event(PollerEvent::CycleCompleted {
            cycle,
            changed: report.changed(),
        });

        report
    }

    fn section_failed(&self, section: Section, error: &crate::Error) {
        if error.is_upstream() {
            debug!("Failed to get {} data: {}", section, error);
        } else {
            debug!("Received unusable {} data: {}", section, error);
        }
        self.emit_event(PollerEvent::SectionFailed {
            section,
            error: error.to_string(),
        });
    }

    fn emit_event(&self, event: PollerEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("Poller event channel full or closed, dropping event");
        }
    }
}
