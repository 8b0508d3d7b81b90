use anyhow::Result;
use async_trait::async_trait;
use twilight_interactions::command::{CommandModel, CreateCommand};

use super::player;
use crate::command_handler::{
    Command, CommandContext, CommandResponseBuilder, GlobalState, Precheck,
};

const MAX_VOLUME: i64 = 150;

#[derive(CommandModel, CreateCommand)]
#[command(name = "volume", desc = "Change the volume of the player.")]
pub struct VolumeCommand {
    #[allow(unused)]
    #[command(desc = "Volume level (0-150)", min_value = 0, max_value = 150)]
    volume: i64,
}

fn validate_volume(volume: i64) -> Result<u16> {
    if !(0..=MAX_VOLUME).contains(&volume) {
        anyhow::bail!("Volume must be between 0 and {MAX_VOLUME}.");
    }
    Ok(u16::try_from(volume)?)
}

#[async_trait]
impl Command<GlobalState> for VolumeCommand {
    const PRECHECKS: &'static [Precheck] = &[Precheck::GuildOnly, Precheck::SameVoiceChannel];

    async fn execute<'ctx>(state: GlobalState, mut cmd_ctx: CommandContext<'ctx>) -> Result<()> {
        let volume: i64 = cmd_ctx.get_arg("volume").ok_or_else(|| {
            anyhow::anyhow!("Volume argument is required and must be a number between 0 and 150.")
        })?;
        let volume = validate_volume(volume)?;

        let player = player(&state, cmd_ctx.require_guild()?)?;
        player.set_volume(volume).await?;

        let response = CommandResponseBuilder::new()
            .content(format!("🔊 Volume set to {volume}%."))
            .build();
        cmd_ctx.reply(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_bounds() {
        assert_eq!(validate_volume(0).unwrap(), 0);
        assert_eq!(validate_volume(150).unwrap(), 150);
        assert!(validate_volume(-1).is_err());
        assert!(validate_volume(151).is_err());
    }
}
