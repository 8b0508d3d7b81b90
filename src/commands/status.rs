use anyhow::Result;
use async_trait::async_trait;
use twilight_interactions::command::{CommandModel, CreateCommand};
use twilight_model::channel::message::Embed;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder};

use crate::command_handler::{
    Command, CommandContext, CommandResponseBuilder, DeferMode, GlobalState,
};
use crate::uplink::{
    FAILURE_THRESHOLD, HeartbeatMode, HeartbeatState, ManagedShard, ShardStatsProvider,
    ShardStatus, TimerKind,
};

const HEALTHY_COLOR: u32 = 0x1DB954;
const DEGRADED_COLOR: u32 = 0xdd7878;

#[derive(CommandModel, CreateCommand)]
#[command(name = "status", desc = "Show the control plane link and shard health.")]
pub struct StatusCommand;

#[async_trait]
impl Command<GlobalState> for StatusCommand {
    const DEFER: DeferMode = DeferMode::Ephemeral;

    async fn execute<'ctx>(state: GlobalState, cmd_ctx: CommandContext<'ctx>) -> Result<()> {
        let heartbeat = state.uplink.snapshot().await;
        let timer = state.uplink.armed_timer().await;
        let shards = state.shard_stats.managed_shards();

        let embed = build_status_embed(
            &heartbeat,
            timer,
            &shards,
            state.shard_stats.total_shards(),
            state.shard_stats.total_guilds(),
        );
        cmd_ctx
            .reply(CommandResponseBuilder::new().embed(embed).ephemeral().build())
            .await?;
        Ok(())
    }
}

fn mode_label(mode: HeartbeatMode) -> &'static str {
    match mode {
        HeartbeatMode::Startup => "starting",
        HeartbeatMode::Active => "heartbeating",
        HeartbeatMode::Reconnecting => "reconnecting",
        HeartbeatMode::Stopped => "stopped",
    }
}

fn shard_line(shard: &ManagedShard) -> String {
    let status = match shard.status {
        ShardStatus::Connecting => "connecting",
        ShardStatus::Ready => "ready",
        ShardStatus::Disconnected => "disconnected",
    };
    let latency = shard
        .latency_ms
        .map_or_else(|| "n/a".to_string(), |ms| format!("{ms}ms"));
    format!(
        "`#{}` {status}, {} guilds, {latency}",
        shard.id, shard.guilds
    )
}

pub fn build_status_embed(
    heartbeat: &HeartbeatState,
    timer: TimerKind,
    shards: &[ManagedShard],
    total_shards: u32,
    total_guilds: usize,
) -> Embed {
    let healthy = heartbeat.connected
        && heartbeat.mode == HeartbeatMode::Active
        && shards.iter().all(|shard| shard.status == ShardStatus::Ready);

    let last_success = heartbeat
        .last_success
        .map_or_else(|| "never".to_string(), |at| format!("<t:{}:R>", at.timestamp()));
    let timer = match timer {
        TimerKind::None => "none",
        TimerKind::Heartbeat => "heartbeat",
        TimerKind::Reconnect => "reconnect",
    };
    let shard_lines = if shards.is_empty() {
        "No shards managed.".to_string()
    } else {
        shards.iter().map(shard_line).collect::<Vec<_>>().join("\n")
    };

    EmbedBuilder::new()
        .title("Shard status")
        .color(if healthy { HEALTHY_COLOR } else { DEGRADED_COLOR })
        .field(EmbedFieldBuilder::new("Uplink", mode_label(heartbeat.mode)).inline())
        .field(EmbedFieldBuilder::new("Timer", timer).inline())
        .field(
            EmbedFieldBuilder::new(
                "Failures",
                format!("{} / {}", heartbeat.consecutive_failures, FAILURE_THRESHOLD),
            )
            .inline(),
        )
        .field(EmbedFieldBuilder::new("Last heartbeat", last_success).inline())
        .field(EmbedFieldBuilder::new("Guilds", total_guilds.to_string()).inline())
        .field(EmbedFieldBuilder::new(
            format!("Shards ({} of {total_shards})", shards.len()),
            shard_lines,
        ))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_shard(id: u32) -> ManagedShard {
        ManagedShard {
            id,
            guilds: 12,
            latency_ms: Some(40),
            status: ShardStatus::Ready,
        }
    }

    fn field<'a>(embed: &'a Embed, name: &str) -> &'a str {
        embed
            .fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
            .unwrap()
    }

    #[test]
    fn test_healthy_status() {
        let heartbeat = HeartbeatState {
            connected: true,
            last_success: Some(chrono::Utc::now()),
            consecutive_failures: 0,
            mode: HeartbeatMode::Active,
        };
        let embed = build_status_embed(&heartbeat, TimerKind::Heartbeat, &[ready_shard(0)], 1, 12);

        assert_eq!(embed.color, Some(HEALTHY_COLOR));
        assert_eq!(field(&embed, "Uplink"), "heartbeating");
        assert_eq!(field(&embed, "Timer"), "heartbeat");
        assert_eq!(field(&embed, "Guilds"), "12");
        assert_eq!(field(&embed, "Shards (1 of 1)"), "`#0` ready, 12 guilds, 40ms");
    }

    #[test]
    fn test_reconnecting_status_is_degraded() {
        let heartbeat = HeartbeatState {
            connected: false,
            last_success: None,
            consecutive_failures: 3,
            mode: HeartbeatMode::Reconnecting,
        };
        let mut shard = ready_shard(2);
        shard.latency_ms = None;
        let embed = build_status_embed(&heartbeat, TimerKind::Reconnect, &[shard], 4, 12);

        assert_eq!(embed.color, Some(DEGRADED_COLOR));
        assert_eq!(field(&embed, "Failures"), "3 / 2");
        assert_eq!(field(&embed, "Last heartbeat"), "never");
        assert_eq!(field(&embed, "Shards (1 of 4)"), "`#2` ready, 12 guilds, n/a");
    }
}
