use anyhow::{Result, anyhow, bail};
use twilight_model::id::{Id, marker::ChannelMarker};

use crate::command_handler::{CommandContext, StateExt};

/// Conditions evaluated in order before a command runs. The first failure aborts the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precheck {
    GuildOnly,
    /// The author must be connected to a voice channel.
    InVoiceChannel,
    /// If the bot is in a voice channel, the author must be in the same one.
    SameVoiceChannel,
}

pub fn run_all<S: StateExt>(state: &S, ctx: &CommandContext<'_>, checks: &[Precheck]) -> Result<()> {
    for check in checks {
        check.evaluate(state, ctx)?;
    }
    Ok(())
}

impl Precheck {
    fn evaluate<S: StateExt>(self, state: &S, ctx: &CommandContext<'_>) -> Result<()> {
        let guild_id = ctx.require_guild()?;
        if self == Precheck::GuildOnly {
            return Ok(());
        }

        let cache = state.cache();
        let author_id = ctx.require_author()?.id;
        let author_channel = cache
            .voice_state(author_id, guild_id)
            .map(|voice_state| voice_state.channel_id());
        let bot_channel = cache.current_user().and_then(|current_user| {
            cache
                .voice_state(current_user.id, guild_id)
                .map(|voice_state| voice_state.channel_id())
        });

        check_voice(self, author_channel, bot_channel)
    }
}

fn check_voice(
    check: Precheck,
    author_channel: Option<Id<ChannelMarker>>,
    bot_channel: Option<Id<ChannelMarker>>,
) -> Result<()> {
    let author_channel = author_channel
        .ok_or_else(|| anyhow!("You must be in a voice channel to use this command."))?;

    if check == Precheck::SameVoiceChannel {
        if let Some(bot_channel) = bot_channel {
            if bot_channel != author_channel {
                bail!("You must be in the same voice channel as me to use this command.");
            }
        }
    }
    Ok(())
}
