use std::collections::VecDeque;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use lavalink_rs::prelude::{SearchEngines, TrackInQueue, TrackLoadData};
use twilight_interactions::command::CreateCommand;
use twilight_mention::Mention;

use super::{author_voice_channel, join, player};
use crate::command_handler::{
    AutocompleteContext, Command, CommandContext, CommandResponseBuilder, DeferMode, GlobalState,
    Precheck, StateExt,
};

/// Queries shorter than this are not searched while typing.
const MIN_AUTOCOMPLETE_QUERY: usize = 3;

#[derive(CreateCommand)]
#[command(name = "play", desc = "Play a song from YouTube or other sources.")]
pub struct PlayCommand {
    #[command(desc = "The song to play", autocomplete = true)]
    pub song: String,
}

/// Links and explicit `source:term` queries go to lavalink untouched, anything else is searched.
fn search_query(input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        anyhow::bail!("Tell me what to play.");
    }
    if input.starts_with("http://") || input.starts_with("https://") {
        return Ok(input.to_string());
    }
    if let Some((source, term)) = input.split_once(':') {
        if !source.is_empty() && !source.contains(' ') && !term.is_empty() && !term.starts_with(' ') {
            return Ok(input.to_string());
        }
    }
    Ok(SearchEngines::YouTube.to_query(input)?)
}

#[async_trait]
impl Command<GlobalState> for PlayCommand {
    const DEFER: DeferMode = DeferMode::Normal;
    const PRECHECKS: &'static [Precheck] = &[
        Precheck::GuildOnly,
        Precheck::InVoiceChannel,
        Precheck::SameVoiceChannel,
    ];

    async fn execute<'ctx>(state: GlobalState, mut cmd_ctx: CommandContext<'ctx>) -> Result<()> {
        let song_query = cmd_ctx
            .get_remainder_arg("song")
            .ok_or_else(|| anyhow!("Song query is missing."))?;
        let guild_id = cmd_ctx.require_guild()?;
        let requester_id = cmd_ctx.require_author()?.id;
        let channel_id = author_voice_channel(&state, &cmd_ctx, guild_id)?;

        let joined = join(&state, guild_id, channel_id).await?;
        let player = player(&state, guild_id)?;

        let loaded = state
            .lavalink()
            .load_tracks(guild_id, &search_query(&song_query)?)
            .await?;

        let (mut tracks_to_queue, playlist_name): (Vec<TrackInQueue>, Option<String>) =
            match loaded.data {
                Some(TrackLoadData::Track(track)) => (vec![track.into()], None),
                Some(TrackLoadData::Search(results)) => {
                    let track = results
                        .into_iter()
                        .next()
                        .ok_or_else(|| anyhow!("No tracks found for `{song_query}`."))?;
                    (vec![track.into()], None)
                }
                Some(TrackLoadData::Playlist(playlist)) => (
                    playlist.tracks.into_iter().map(TrackInQueue::from).collect(),
                    Some(playlist.info.name),
                ),
                Some(TrackLoadData::Error(e)) => {
                    return Err(anyhow!("Error loading tracks: {}", e.message));
                }
                None => return Err(anyhow!("No tracks found for `{song_query}`.")),
            };

        let Some(first) = tracks_to_queue.first() else {
            return Err(anyhow!("No tracks were loaded to queue."));
        };

        let mut reply_message = match (&playlist_name, first.track.info.uri.as_ref()) {
            (Some(name), _) => format!(
                "`＋` Queued playlist: [{}] ({} tracks)",
                name,
                tracks_to_queue.len()
            ),
            (None, Some(uri)) => format!("`＋` Queued [`{}`](<{}>)", first.track.info.title, uri),
            (None, None) => format!("`＋` Queued: `{}`", first.track.info.title),
        };
        if joined {
            reply_message = format!("🎙️ Joined {}\n{reply_message}", channel_id.mention());
        }

        for track_in_queue in &mut tracks_to_queue {
            track_in_queue.track.user_data =
                Some(serde_json::json!({ "requester_id": requester_id }));
        }

        let queue = player.get_queue();
        queue.append(VecDeque::from(tracks_to_queue))?;

        if player.get_player().await?.track.is_none()
            && queue.get_track(0).await.is_ok_and(|track| track.is_some())
        {
            player.skip()?;
        }

        cmd_ctx
            .reply(CommandResponseBuilder::new().content(reply_message).build())
            .await?;
        Ok(())
    }

    async fn autocomplete(state: GlobalState, ctx: AutocompleteContext) -> Result<Vec<String>> {
        let (Some(guild_id), partial) = (ctx.guild_id, ctx.partial.trim()) else {
            return Ok(Vec::new());
        };
        if ctx.option != "song"
            || partial.chars().count() < MIN_AUTOCOMPLETE_QUERY
            || partial.starts_with("http")
        {
            return Ok(Vec::new());
        }

        let loaded = state
            .lavalink()
            .load_tracks(guild_id, &search_query(partial)?)
            .await?;

        Ok(match loaded.data {
            Some(TrackLoadData::Search(results)) => results
                .into_iter()
                .map(|track| format!("{} {}", track.info.title, track.info.author))
                .collect(),
            Some(TrackLoadData::Track(track)) => vec![track.info.title],
            _ => Vec::new(),
        })
    }
}
