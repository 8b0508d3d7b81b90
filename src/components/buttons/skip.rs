use std::sync::Arc;

use twilight_model::{
    application::interaction::Interaction,
    http::interaction::{InteractionResponse, InteractionResponseType},
};
use twilight_util::builder::InteractionResponseDataBuilder;

use crate::command_handler::StateExt;
use crate::state::State;

pub async fn skip_button_handler(state: Arc<State>, interaction: Interaction) -> anyhow::Result<()> {
    let guild_id = interaction
        .guild_id
        .ok_or_else(|| anyhow::anyhow!("Interaction must be in a guild to skip the track"))?;

    let player = state
        .lavalink()
        .get_player_context(guild_id)
        .ok_or_else(|| anyhow::anyhow!("No player found for guild: {}", guild_id))?;

    let track = player
        .get_player()
        .await?
        .track
        .ok_or_else(|| anyhow::anyhow!("No track is currently playing in guild: {}", guild_id))?;

    player.skip()?;

    // The controls belonged to the skipped track, so they are removed.
    state
        .http
        .interaction(interaction.application_id)
        .create_response(
            interaction.id,
            &interaction.token,
            &InteractionResponse {
                kind: InteractionResponseType::UpdateMessage,
                data: Some(
                    InteractionResponseDataBuilder::new()
                        .content(format!("⏩ Skipped {} to the next track.", track.info.title))
                        .embeds(Vec::new())
                        .components(Vec::new())
                        .build(),
                ),
            },
        )
        .await?;

    Ok(())
}
