use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::error::UplinkError;
use super::model::{
    BootConfig, HeartbeatRequest, HeartbeatResponse, NOT_REGISTERED_MESSAGE, ProbeResponse,
    ResponseStatus,
};
use super::transport::UplinkTransport;

/// In-memory control plane whose answers are flipped by the test.
pub struct MockUplink {
    heartbeat_ok: AtomicBool,
    heartbeat_registration_error: AtomicBool,
    heartbeat_delay: Mutex<Duration>,
    probe_ok: AtomicBool,
    probe_registration_error: AtomicBool,
    boot_config: Mutex<Option<BootConfig>>,
    heartbeats: AtomicUsize,
    probes: AtomicUsize,
    last_request: Mutex<Option<HeartbeatRequest>>,
}

impl MockUplink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            heartbeat_ok: AtomicBool::new(true),
            heartbeat_registration_error: AtomicBool::new(false),
            heartbeat_delay: Mutex::new(Duration::ZERO),
            probe_ok: AtomicBool::new(true),
            probe_registration_error: AtomicBool::new(false),
            boot_config: Mutex::new(None),
            heartbeats: AtomicUsize::new(0),
            probes: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn set_heartbeat_ok(&self, ok: bool) {
        self.heartbeat_ok.store(ok, Ordering::SeqCst);
    }

    pub fn set_heartbeat_registration_error(&self, enabled: bool) {
        self.heartbeat_registration_error
            .store(enabled, Ordering::SeqCst);
    }

    /// Every heartbeat answer is held back this long.
    pub fn set_heartbeat_delay(&self, delay: Duration) {
        *self.heartbeat_delay.lock().unwrap() = delay;
    }

    pub fn set_probe_ok(&self, ok: bool) {
        self.probe_ok.store(ok, Ordering::SeqCst);
    }

    pub fn set_probe_registration_error(&self, enabled: bool) {
        self.probe_registration_error.store(enabled, Ordering::SeqCst);
    }

    pub fn set_boot_config(&self, boot_config: BootConfig) {
        *self.boot_config.lock().unwrap() = Some(boot_config);
    }

    pub fn heartbeats(&self) -> usize {
        self.heartbeats.load(Ordering::SeqCst)
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<HeartbeatRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl UplinkTransport for MockUplink {
    async fn send_heartbeat(
        &self,
        request: &HeartbeatRequest,
    ) -> Result<HeartbeatResponse, UplinkError> {
        self.heartbeats.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        let delay = *self.heartbeat_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.heartbeat_registration_error.load(Ordering::SeqCst) {
            return Ok(HeartbeatResponse {
                status: ResponseStatus::Error,
                message: NOT_REGISTERED_MESSAGE.to_string(),
                result: None,
            });
        }

        if !self.heartbeat_ok.load(Ordering::SeqCst) {
            return Err(UplinkError::Logical("uplink offline".to_string()));
        }

        let boot_config = if request.request_boot_conf {
            self.boot_config.lock().unwrap().clone()
        } else {
            None
        };

        Ok(HeartbeatResponse {
            status: ResponseStatus::Success,
            message: if boot_config.is_some() {
                "bootconf".to_string()
            } else {
                "ok".to_string()
            },
            result: boot_config,
        })
    }

    async fn probe(&self) -> Result<ProbeResponse, UplinkError> {
        self.probes.fetch_add(1, Ordering::SeqCst);

        if self.probe_registration_error.load(Ordering::SeqCst) {
            return Ok(ProbeResponse {
                status: ResponseStatus::Error,
                message: NOT_REGISTERED_MESSAGE.to_string(),
            });
        }

        if self.probe_ok.load(Ordering::SeqCst) {
            Ok(ProbeResponse {
                status: ResponseStatus::Success,
                message: String::new(),
            })
        } else {
            Err(UplinkError::Logical("uplink offline".to_string()))
        }
    }
}
