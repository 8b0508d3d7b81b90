use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use lavalink_rs::model::track::TrackData;
use twilight_interactions::command::{CommandModel, CreateCommand};
use twilight_model::channel::message::Embed;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder, ImageSource};

use super::player;
use crate::command_handler::{
    Command, CommandContext, CommandResponseBuilder, GlobalState, Precheck,
};
use crate::components::buttons::action_menu;

#[derive(CommandModel, CreateCommand)]
#[command(name = "now_playing", desc = "Show the currently playing song.")]
pub struct NowPlayingCommand;

#[async_trait]
impl Command<GlobalState> for NowPlayingCommand {
    const PRECHECKS: &'static [Precheck] = &[Precheck::GuildOnly];

    async fn execute<'ctx>(state: GlobalState, cmd_ctx: CommandContext<'ctx>) -> Result<()> {
        let player = player(&state, cmd_ctx.require_guild()?)?;
        let player_data = player.get_player().await?;
        let track = player_data
            .track
            .as_ref()
            .ok_or_else(|| anyhow!("No track is currently playing."))?;

        let embed = build_now_playing_embed(
            track,
            player_data.volume,
            player_data.state.position,
            chrono::Utc::now().timestamp(),
        );
        let response = CommandResponseBuilder::new()
            .embed(embed)
            .component(action_menu(player_data.paused))
            .build();

        cmd_ctx.reply(response).await?;
        Ok(())
    }
}

/// `position_ms` is the playback position, `now` a unix timestamp used for the "finishes" field.
pub fn build_now_playing_embed(track: &TrackData, volume: u16, position_ms: u64, now: i64) -> Embed {
    let position = Duration::from_secs(position_ms / 1000);
    let length = Duration::from_secs(track.info.length / 1000);
    let remaining = length.saturating_sub(position);
    let finishes_at = now.saturating_add_unsigned(remaining.as_secs());

    let mut embed = EmbedBuilder::new()
        .title("🎶 Now Playing")
        .description(format!(
            "**{}** by **{}**",
            track.info.title, track.info.author
        ))
        .color(0x1DB954)
        .field(
            EmbedFieldBuilder::new(
                "Duration",
                format!(
                    "{} / {}",
                    humantime::format_duration(position),
                    humantime::format_duration(length)
                ),
            )
            .inline(),
        )
        .field(EmbedFieldBuilder::new("Finishes", format!("<t:{finishes_at}:R>")).inline())
        .field(EmbedFieldBuilder::new("Volume", format!("{volume}%")).inline());

    if let Some(uri) = &track.info.uri {
        embed = embed.url(uri.as_str());
    }
    if let Some(thumbnail) = track
        .info
        .artwork_url
        .as_deref()
        .and_then(|url| ImageSource::url(url).ok())
    {
        embed = embed.thumbnail(thumbnail);
    }

    embed.build()
}
