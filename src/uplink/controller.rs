use std::future::Future;
use std::ops::ControlFlow;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use super::error::UplinkError;
use super::model::{HeartbeatOutcome, HeartbeatRequest, ManagedShard, ProbeResponse};
use super::transport::UplinkTransport;

/// Failed ticks tolerated before the controller falls back to reconnect polling.
pub const FAILURE_THRESHOLD: u32 = 2;

type TimerTask = Pin<Box<dyn Future<Output = ()> + Send>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatMode {
    Startup,
    Active,
    Reconnecting,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatState {
    pub connected: bool,
    pub last_success: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub mode: HeartbeatMode,
}

impl Default for HeartbeatState {
    fn default() -> Self {
        Self {
            connected: false,
            last_success: None,
            consecutive_failures: 0,
            mode: HeartbeatMode::Startup,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Reconnect,
}

impl HeartbeatState {
    pub fn record_success(&mut self, at: DateTime<Utc>) {
        self.consecutive_failures = 0;
        self.connected = true;
        self.last_success = Some(at);
    }

    /// Counts a failed exchange. Only an active heartbeat can fall into reconnect polling.
    pub fn record_failure(&mut self) -> Transition {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        if self.mode == HeartbeatMode::Active && self.consecutive_failures > FAILURE_THRESHOLD {
            Transition::Reconnect
        } else {
            Transition::Stay
        }
    }
}

/// Who this process is, as reported in every heartbeat.
#[derive(Debug, Clone)]
pub struct UplinkIdentity {
    pub port: u16,
    pub server_id: String,
    pub communication_token: String,
    pub server_location: String,
}

#[derive(Debug, Clone, Copy)]
pub struct HeartbeatTimings {
    pub heartbeat_interval: Duration,
    pub reconnect_interval: Duration,
}

impl Default for HeartbeatTimings {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_millis(5_000),
            reconnect_interval: Duration::from_millis(10_000),
        }
    }
}

/// Source of the `managedShards` statistics attached to each heartbeat.
pub trait ShardStatsProvider: Send + Sync {
    fn managed_shards(&self) -> Vec<ManagedShard>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    None,
    Heartbeat,
    Reconnect,
}

/// The single timer slot. Holding both timers in one slot keeps them mutually exclusive.
#[derive(Default)]
enum ArmedTimer {
    #[default]
    None,
    Heartbeat(JoinHandle<()>),
    Reconnect(JoinHandle<()>),
}

impl ArmedTimer {
    fn kind(&self) -> TimerKind {
        match self {
            ArmedTimer::None => TimerKind::None,
            ArmedTimer::Heartbeat(_) => TimerKind::Heartbeat,
            ArmedTimer::Reconnect(_) => TimerKind::Reconnect,
        }
    }

    fn abort(self) {
        match self {
            ArmedTimer::Heartbeat(handle) | ArmedTimer::Reconnect(handle) => handle.abort(),
            ArmedTimer::None => {}
        }
    }
}

struct Control {
    state: HeartbeatState,
    timer: ArmedTimer,
}

struct Inner {
    transport: Arc<dyn UplinkTransport>,
    identity: UplinkIdentity,
    timings: HeartbeatTimings,
    startup_time: DateTime<Utc>,
    control: Mutex<Control>,
    stats: OnceCell<Arc<dyn ShardStatsProvider>>,
}

/// Keeps the control plane informed that this process is alive.
///
/// A periodic heartbeat runs while the uplink answers. After more than
/// [`FAILURE_THRESHOLD`] consecutive failures the heartbeat timer is replaced by
/// a reconnect timer that probes the API at a constant interval until it answers,
/// then re-initializes the heartbeat.
#[derive(Clone)]
pub struct HeartbeatController {
    inner: Arc<Inner>,
}

impl HeartbeatController {
    pub fn new(
        transport: Arc<dyn UplinkTransport>,
        identity: UplinkIdentity,
        timings: HeartbeatTimings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                identity,
                timings,
                startup_time: Utc::now(),
                control: Mutex::new(Control {
                    state: HeartbeatState::default(),
                    timer: ArmedTimer::None,
                }),
                stats: OnceCell::new(),
            }),
        }
    }

    pub fn attach_stats(&self, provider: Arc<dyn ShardStatsProvider>) {
        if self.inner.stats.set(provider).is_err() {
            tracing::warn!("Shard statistics provider already attached; ignoring");
        }
    }

    pub async fn snapshot(&self) -> HeartbeatState {
        self.inner.control.lock().await.state.clone()
    }

    pub async fn armed_timer(&self) -> TimerKind {
        self.inner.control.lock().await.timer.kind()
    }

    /// Performs one heartbeat exchange.
    ///
    /// With `startup` set the boot configuration is requested and no timer is
    /// armed; the caller calls [`start`](Self::start) once it accepted the
    /// configuration. Otherwise the periodic timer is armed afterwards,
    /// whatever the outcome of the exchange, unless [`stop`](Self::stop) ran meanwhile.
    #[tracing::instrument(skip(self))]
    pub async fn init_heartbeat(
        &self,
        skip_checks: bool,
        startup: bool,
    ) -> Result<HeartbeatOutcome, UplinkError> {
        if !skip_checks && !self.is_api_reachable().await {
            return Err(UplinkError::Unreachable);
        }

        let result = self.handle_heartbeat(startup).await;

        let mut control = self.inner.control.lock().await;
        if !startup && control.state.mode == HeartbeatMode::Stopped {
            tracing::debug!("Controller stopped during the exchange, not arming a timer");
            return result;
        }

        let transition = match &result {
            Ok(_) => {
                control.state.record_success(Utc::now());
                Transition::Stay
            }
            Err(error) => {
                log_failure(error, control.state.consecutive_failures + 1);
                control.state.record_failure()
            }
        };

        if !startup {
            match transition {
                Transition::Stay => self.arm_heartbeat(&mut control).abort(),
                Transition::Reconnect => self.begin_reconnect(&mut control).abort(),
            }
        }

        result
    }

    /// Sends one heartbeat and interprets the answer.
    pub async fn handle_heartbeat(&self, startup: bool) -> Result<HeartbeatOutcome, UplinkError> {
        let request = self.build_request(startup);
        let response = self.inner.transport.send_heartbeat(&request).await?;
        response.into_outcome()
    }

    pub async fn is_api_reachable(&self) -> bool {
        match self
            .inner
            .transport
            .probe()
            .await
            .and_then(ProbeResponse::into_result)
        {
            Ok(()) => true,
            Err(UplinkError::Registration(message)) => {
                tracing::error!(%message, "Uplink refused this server's registration");
                false
            }
            Err(error) => {
                tracing::debug!(%error, "Uplink probe failed");
                false
            }
        }
    }

    /// Arms the periodic heartbeat after a successful startup exchange.
    pub async fn start(&self) {
        let mut control = self.inner.control.lock().await;
        self.arm_heartbeat(&mut control).abort();
        tracing::info!(
            interval = ?self.inner.timings.heartbeat_interval,
            "Uplink heartbeat started"
        );
    }

    pub async fn stop(&self) {
        let mut control = self.inner.control.lock().await;
        control.state.mode = HeartbeatMode::Stopped;
        control.state.connected = false;
        std::mem::take(&mut control.timer).abort();
        tracing::info!("Uplink heartbeat stopped");
    }

    fn build_request(&self, startup: bool) -> HeartbeatRequest {
        let identity = &self.inner.identity;
        HeartbeatRequest {
            port: identity.port,
            server_id: identity.server_id.clone(),
            communication_token: identity.communication_token.clone(),
            managed_shards: self.inner.stats.get().map(|stats| stats.managed_shards()),
            startup_time: self.inner.startup_time.timestamp_millis(),
            current_time: Utc::now().timestamp_millis(),
            server_location: identity.server_location.clone(),
            request_boot_conf: startup,
        }
    }

    /// Installs a fresh heartbeat timer and returns whatever was armed before.
    fn arm_heartbeat(&self, control: &mut Control) -> ArmedTimer {
        control.state.mode = HeartbeatMode::Active;
        let handle = tokio::spawn(self.clone().heartbeat_loop());
        std::mem::replace(&mut control.timer, ArmedTimer::Heartbeat(handle))
    }

    /// Installs the reconnect timer and returns whatever was armed before.
    fn begin_reconnect(&self, control: &mut Control) -> ArmedTimer {
        control.state.mode = HeartbeatMode::Reconnecting;
        control.state.connected = false;
        tracing::warn!(
            failures = control.state.consecutive_failures,
            interval = ?self.inner.timings.reconnect_interval,
            "Uplink lost, polling for reconnect"
        );
        let handle = tokio::spawn(self.clone().reconnect_loop());
        std::mem::replace(&mut control.timer, ArmedTimer::Reconnect(handle))
    }

    async fn tick(&self) -> ControlFlow<()> {
        let result = self.handle_heartbeat(false).await;

        let mut control = self.inner.control.lock().await;
        if control.state.mode != HeartbeatMode::Active {
            return ControlFlow::Break(());
        }

        match result {
            Ok(_) => {
                control.state.record_success(Utc::now());
                ControlFlow::Continue(())
            }
            Err(error) => {
                log_failure(&error, control.state.consecutive_failures + 1);
                match control.state.record_failure() {
                    Transition::Stay => ControlFlow::Continue(()),
                    Transition::Reconnect => {
                        // The previous slot holds this task's own handle: drop it, don't abort it.
                        drop(self.begin_reconnect(&mut control));
                        ControlFlow::Break(())
                    }
                }
            }
        }
    }

    fn heartbeat_loop(self) -> TimerTask {
        Box::pin(async move {
            let period = self.inner.timings.heartbeat_interval;
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if self.tick().await.is_break() {
                    break;
                }
            }
        })
    }

    fn reconnect_loop(self) -> TimerTask {
        Box::pin(async move {
            let period = self.inner.timings.reconnect_interval;
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if !self.is_api_reachable().await {
                    tracing::warn!(retry_in = ?period, "Uplink still unreachable");
                    continue;
                }

                {
                    let mut control = self.inner.control.lock().await;
                    if control.state.mode != HeartbeatMode::Reconnecting {
                        return;
                    }
                    // Own handle, see `tick`.
                    drop(std::mem::take(&mut control.timer));
                    control.state.consecutive_failures = 0;
                }

                tracing::info!("Uplink reachable again, resuming heartbeat");
                if let Err(error) = self.init_heartbeat(true, false).await {
                    tracing::warn!(%error, "First heartbeat after reconnect failed");
                }
                return;
            }
        })
    }
}

fn log_failure(error: &UplinkError, failures: u32) {
    match error {
        UplinkError::Registration(message) => {
            tracing::error!(%message, failures, "Heartbeat rejected: server is not registered");
        }
        error => {
            tracing::warn!(%error, failures, "Heartbeat failed");
        }
    }
}
