use anyhow::Result;
use async_trait::async_trait;
use twilight_interactions::command::{CommandModel, CreateCommand};

use crate::command_handler::{Command, CommandContext, CommandResponseBuilder, GlobalState};

#[derive(CommandModel, CreateCommand)]
#[command(name = "ping", desc = "Check if the bot is responsive.")]
pub struct PingCommand;

#[async_trait]
impl Command<GlobalState> for PingCommand {
    async fn execute<'ctx>(state: GlobalState, cmd_ctx: CommandContext<'ctx>) -> Result<()> {
        // In DMs there is no shard to attribute the message to.
        let latency = match cmd_ctx.guild_id() {
            Some(guild_id) => {
                let shard_id = state.shard_stats.shard_for_guild(guild_id);
                state
                    .shard_stats
                    .get(shard_id)
                    .and_then(|shard| shard.latency_ms)
            }
            None => state.shard_stats.average_latency(),
        };

        let Some(latency) = latency else {
            anyhow::bail!("Latency is not available; Not enough data collected yet.");
        };

        let response = CommandResponseBuilder::new()
            .content(format!("🏓 Pong! `({latency}ms)`"))
            .build();
        cmd_ctx.reply(response).await?;
        Ok(())
    }
}
