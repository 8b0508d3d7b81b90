use anyhow::Result;
use async_trait::async_trait;
use twilight_interactions::command::{CommandModel, CreateCommand};

use super::leave;
use crate::command_handler::{
    Command, CommandContext, CommandResponseBuilder, GlobalState, Precheck,
};

#[derive(CommandModel, CreateCommand)]
#[command(name = "stop", desc = "Stop the playback and leave the voice channel.")]
pub struct StopCommand;

#[async_trait]
impl Command<GlobalState> for StopCommand {
    const PRECHECKS: &'static [Precheck] = &[Precheck::GuildOnly, Precheck::SameVoiceChannel];

    async fn execute<'ctx>(state: GlobalState, cmd_ctx: CommandContext<'ctx>) -> Result<()> {
        leave(&state, cmd_ctx.require_guild()?).await?;

        let response = CommandResponseBuilder::new().content("⏹️ Stopped").build();
        cmd_ctx.reply(response).await?;

        Ok(())
    }
}
