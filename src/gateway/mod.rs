mod manager;
mod process;
mod runner;
pub mod setup;
mod stats;

use std::sync::Arc;

use tokio::sync::mpsc;
use twilight_gateway::Shard;

use crate::state::State;

pub use manager::{RunningShards, ShardManager};
pub use process::process;
pub use runner::runner;
pub use setup::initialize_and_run_bot;
pub use stats::{ShardInfo, ShardStatsRegistry};

/// Everything a shard runner owns.
pub struct Bot {
    pub shard: Shard,
    pub state: Arc<State>,
    pub shard_info_tx: mpsc::Sender<ShardInfo>,
}
