//! Liveness signalling and boot negotiation with the control plane.

mod boot;
mod controller;
mod error;
pub mod model;
mod transport;

#[cfg(test)]
mod testing;

pub use boot::{controller_from_config, negotiate};
pub use controller::{
    FAILURE_THRESHOLD, HeartbeatController, HeartbeatMode, HeartbeatState, ShardStatsProvider,
    TimerKind,
};
pub use error::UplinkError;
pub use model::{BootConfig, ManagedShard, ShardStatus};
