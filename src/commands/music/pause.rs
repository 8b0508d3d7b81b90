use anyhow::Result;
use async_trait::async_trait;
use twilight_interactions::command::{CommandModel, CreateCommand};

use super::player;
use crate::command_handler::{
    Command, CommandContext, CommandResponseBuilder, GlobalState, Precheck,
};

#[derive(CommandModel, CreateCommand)]
#[command(name = "pause", desc = "Pause or resume the player.")]
pub struct PauseCommand;

#[async_trait]
impl Command<GlobalState> for PauseCommand {
    const PRECHECKS: &'static [Precheck] = &[Precheck::GuildOnly, Precheck::SameVoiceChannel];

    async fn execute<'ctx>(state: GlobalState, cmd_ctx: CommandContext<'ctx>) -> Result<()> {
        let player = player(&state, cmd_ctx.require_guild()?)?;
        let paused = !player.get_player().await?.paused;
        player.set_pause(paused).await?;

        let content = if paused { "⏸️ Paused" } else { "▶️ Resumed" };
        cmd_ctx
            .reply(CommandResponseBuilder::new().content(content).build())
            .await?;
        Ok(())
    }
}
