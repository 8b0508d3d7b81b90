use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use twilight_gateway::{ConfigBuilder, Intents, MessageSender, Shard, ShardId};
use twilight_model::gateway::payload::outgoing::update_presence::UpdatePresencePayload;

use super::{Bot, ShardInfo, ShardStatsRegistry, runner};
use crate::state::State;
use crate::uplink::BootConfig;

const SHARD_INFO_BUFFER: usize = 64;

fn intents() -> Intents {
    Intents::GUILDS
        | Intents::GUILD_MESSAGES
        | Intents::GUILD_VOICE_STATES
        | Intents::MESSAGE_CONTENT
}

/// The shards assigned to this process by the boot configuration.
pub struct ShardManager {
    shards: Vec<Shard>,
    stats: Arc<ShardStatsRegistry>,
}

impl ShardManager {
    pub fn new(
        token: &str,
        boot_config: &BootConfig,
        presence: &UpdatePresencePayload,
    ) -> anyhow::Result<Self> {
        let total_shards = boot_config.total_shards;
        let shard_ids = boot_config.managed_shard_ids();
        if shard_ids.is_empty() {
            anyhow::bail!("Boot configuration assigns no shards (total: {total_shards})");
        }

        let shards = shard_ids
            .iter()
            .map(|&id| {
                let shard_id = ShardId::new_checked(id, total_shards)
                    .with_context(|| format!("Invalid shard {id} of {total_shards}"))?;
                let config = ConfigBuilder::new(token.to_string(), intents())
                    .presence(presence.clone())
                    .build();
                Ok(Shard::with_config(shard_id, config))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        tracing::info!(total_shards, shards = ?shard_ids, "Created shards");

        Ok(Self {
            shards,
            stats: Arc::new(ShardStatsRegistry::new(total_shards, &shard_ids)),
        })
    }

    /// Gateway senders keyed by shard number, as songbird expects them.
    pub fn senders(&self) -> HashMap<u32, MessageSender> {
        self.shards
            .iter()
            .map(|shard| (shard.id().number(), shard.sender()))
            .collect()
    }

    pub fn stats(&self) -> Arc<ShardStatsRegistry> {
        self.stats.clone()
    }

    /// Spawns one runner per shard plus the collector folding their reports into the stats registry.
    pub fn run(self, state: Arc<State>) -> RunningShards {
        let (shard_info_tx, mut shard_info_rx) = mpsc::channel::<ShardInfo>(SHARD_INFO_BUFFER);

        let stats = self.stats.clone();
        let collector = tokio::spawn(async move {
            while let Some(info) = shard_info_rx.recv().await {
                tracing::debug!(?info, "Shard info update");
                stats.apply(info);
            }
            tracing::info!("Shard info channel closed, statistics updates will stop.");
        });

        let mut shutdown_senders = Vec::with_capacity(self.shards.len());
        let mut runners = Vec::with_capacity(self.shards.len());
        for shard in self.shards {
            let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
            let bot = Bot {
                shard,
                state: state.clone(),
                shard_info_tx: shard_info_tx.clone(),
            };
            shutdown_senders.push(shutdown_tx);
            runners.push(tokio::spawn(runner(bot, shutdown_rx)));
        }

        RunningShards {
            shutdown_senders,
            runners,
            collector,
        }
    }
}

pub struct RunningShards {
    shutdown_senders: Vec<oneshot::Sender<()>>,
    runners: Vec<JoinHandle<anyhow::Result<()>>>,
    collector: JoinHandle<()>,
}

impl RunningShards {
    /// Signals every runner and waits for all of them to close their shard.
    pub async fn shutdown(self) {
        for shutdown_tx in self.shutdown_senders {
            if shutdown_tx.send(()).is_err() {
                tracing::warn!("Failed to send shutdown signal to a runner; it might have already exited.");
            }
        }

        for handle in self.runners {
            match handle.await {
                Ok(Ok(())) => tracing::info!("Gateway runner finished successfully."),
                Ok(Err(e)) => tracing::error!(error = ?e, "Gateway runner failed."),
                Err(e) => tracing::error!(error = ?e, "Gateway runner task panicked or was cancelled."),
            }
        }

        // Runners held the last senders; the collector drains and exits on its own.
        if let Err(e) = self.collector.await {
            tracing::error!(error = ?e, "Shard info collector panicked or was cancelled.");
        }
    }
}
