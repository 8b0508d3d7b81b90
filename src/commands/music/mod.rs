mod now_playing;
mod pause;
mod play;
mod queue;
mod skip;
mod stop;
mod volume;

pub use now_playing::NowPlayingCommand;
pub use pause::PauseCommand;
pub use play::PlayCommand;
pub use queue::QueueCommand;
pub use skip::SkipCommand;
pub use stop::StopCommand;
pub use volume::VolumeCommand;

use std::sync::Arc;

use anyhow::anyhow;
use lavalink_rs::model::player::ConnectionInfo;
use lavalink_rs::player_context::PlayerContext;
use songbird::ConnectionInfo as SongbirdConnectionInfo;
use twilight_model::id::{
    Id,
    marker::{ChannelMarker, GuildMarker},
};

use crate::command_handler::{CommandContext, GlobalState, StateExt};

fn convert_connection_info(connection_info: SongbirdConnectionInfo) -> ConnectionInfo {
    ConnectionInfo {
        endpoint: connection_info.endpoint,
        token: connection_info.token,
        session_id: connection_info.session_id,
    }
}

/// The voice channel the command author is connected to, according to the cache.
pub fn author_voice_channel(
    state: &GlobalState,
    ctx: &CommandContext<'_>,
    guild_id: Id<GuildMarker>,
) -> anyhow::Result<Id<ChannelMarker>> {
    let author_id = ctx.require_author()?.id;
    state
        .cache
        .voice_state(author_id, guild_id)
        .map(|voice_state| voice_state.channel_id())
        .ok_or_else(|| anyhow!("You must be in a voice channel to use this command."))
}

/// Connects to the channel and creates the lavalink player. Returns false if already connected.
pub async fn join(
    state: &GlobalState,
    guild_id: Id<GuildMarker>,
    channel_id: Id<ChannelMarker>,
) -> anyhow::Result<bool> {
    if state.songbird().get(guild_id).is_some()
        && state.lavalink().get_player_context(guild_id).is_some()
    {
        return Ok(false);
    }

    let (connection_info, _) = state
        .songbird()
        .join_gateway(guild_id, channel_id)
        .await
        .map_err(|e| anyhow!("Failed to join voice channel, {}", e))?;

    state
        .lavalink()
        .create_player_context_with_data::<(Id<ChannelMarker>, Arc<twilight_http::Client>)>(
            guild_id,
            convert_connection_info(connection_info),
            Arc::new((channel_id, state.http.clone())),
        )
        .await?;

    tracing::info!(%guild_id, %channel_id, "Joined voice channel");
    Ok(true)
}

pub async fn leave(state: &GlobalState, guild_id: Id<GuildMarker>) -> anyhow::Result<()> {
    state.songbird().remove(guild_id).await?;
    state.lavalink().delete_player(guild_id).await?;
    tracing::info!(%guild_id, "Left voice channel");
    Ok(())
}

pub fn player(state: &GlobalState, guild_id: Id<GuildMarker>) -> anyhow::Result<PlayerContext> {
    state
        .lavalink()
        .get_player_context(guild_id)
        .ok_or_else(|| anyhow!("No player found for this guild."))
}

/// `m:ss`, or `h:mm:ss` past the hour.
pub fn format_millis(millis: u64) -> String {
    let total_secs = millis / 1000;
    let (hours, minutes, seconds) = (total_secs / 3600, (total_secs / 60) % 60, total_secs % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(0), "0:00");
        assert_eq!(format_millis(61_999), "1:01");
        assert_eq!(format_millis(3_725_000), "1:02:05");
    }
}
