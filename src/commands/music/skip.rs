use anyhow::{Result, anyhow};
use async_trait::async_trait;
use twilight_interactions::command::{CommandModel, CreateCommand};

use super::player;
use crate::command_handler::{
    Command, CommandContext, CommandResponseBuilder, GlobalState, Precheck,
};

#[derive(CommandModel, CreateCommand)]
#[command(name = "skip", desc = "Skip the currently playing song.")]
pub struct SkipCommand;

#[async_trait]
impl Command<GlobalState> for SkipCommand {
    const PRECHECKS: &'static [Precheck] = &[Precheck::GuildOnly, Precheck::SameVoiceChannel];

    async fn execute<'ctx>(state: GlobalState, cmd_ctx: CommandContext<'ctx>) -> Result<()> {
        let player = player(&state, cmd_ctx.require_guild()?)?;

        let track = player
            .get_player()
            .await?
            .track
            .ok_or_else(|| anyhow!("No track is currently playing."))?;

        player.skip()?;

        let response = CommandResponseBuilder::new()
            .content(format!("⏩ Skipped {} to the next track.", track.info.title))
            .build();
        cmd_ctx.reply(response).await?;

        Ok(())
    }
}
