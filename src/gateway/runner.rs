use std::collections::HashSet;

use tokio::sync::oneshot;
use twilight_gateway::{CloseFrame, Event, EventTypeFlags, StreamExt};
use twilight_model::id::{Id, marker::GuildMarker};

use super::{Bot, ShardInfo};
use crate::uplink::ShardStatus;

/// Drives one shard: forwards its events and reports its statistics.
#[tracing::instrument(skip(bot, shutdown_rx), fields(shard = bot.shard.id().number()))]
pub async fn runner(mut bot: Bot, mut shutdown_rx: oneshot::Receiver<()>) -> anyhow::Result<()> {
    let shard_id = bot.shard.id().number();
    let shard_info_sender = bot.shard_info_tx.clone();
    let mut guilds: HashSet<Id<GuildMarker>> = HashSet::new();

    let report = |info: ShardInfo| {
        let sender = shard_info_sender.clone();
        async move {
            if let Err(e) = sender.send(info).await {
                tracing::warn!("Failed to send shard info: {}", e);
            }
        }
    };

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown_rx => {
                tracing::info!("Gateway runner received shutdown signal. Exiting event loop.");
                break;
            }

            item = bot.shard.next_event(EventTypeFlags::all()) => {
                let event = match item {
                    None => {
                        tracing::info!("Shard event stream ended. Runner will exit.");
                        break;
                    }
                    Some(Ok(event)) => event,
                    Some(Err(source)) => {
                        tracing::warn!(?source, "Error receiving event from shard");
                        continue;
                    }
                };

                match &event {
                    Event::GatewayClose(frame) => {
                        if matches!(
                            shutdown_rx.try_recv(),
                            Err(oneshot::error::TryRecvError::Empty)
                        ) {
                            tracing::warn!(?frame, "Gateway connection closed unexpectedly by Discord.");
                        } else {
                            tracing::info!(?frame, "Gateway connection closed during planned shutdown.");
                        }
                        report(ShardInfo::new(shard_id).status(ShardStatus::Disconnected)).await;
                        break;
                    }
                    Event::Ready(ready) => {
                        guilds = ready.guilds.iter().map(|guild| guild.id).collect();
                        report(
                            ShardInfo::new(shard_id)
                                .guilds(guilds.len())
                                .status(ShardStatus::Ready),
                        )
                        .await;
                    }
                    Event::GuildCreate(guild) => {
                        if guilds.insert(guild.id()) {
                            report(ShardInfo::new(shard_id).guilds(guilds.len())).await;
                        }
                    }
                    Event::GuildDelete(guild) => {
                        if guilds.remove(&guild.id) {
                            report(ShardInfo::new(shard_id).guilds(guilds.len())).await;
                        }
                    }
                    Event::GatewayHeartbeatAck => {
                        match bot.shard.latency().average() {
                            Some(duration) => {
                                report(ShardInfo::new(shard_id).latency(duration.as_millis())).await;
                            }
                            None => tracing::debug!("No latency data yet after heartbeat ack"),
                        }
                    }
                    _ => {}
                }

                let state = bot.state.clone();
                tokio::spawn(async move {
                    state.songbird.process(&event).await;
                    state.cache.update(&event);

                    if let Err(e) = super::process(event, state).await {
                        tracing::error!(error = ?e, "Error processing event");
                    }
                });
            }
        }
    }

    tracing::info!("Gateway runner loop ended. Closing shard...");
    bot.shard.close(CloseFrame::NORMAL);

    Ok(())
}
