use std::sync::Arc;

use twilight_model::{
    application::interaction::Interaction,
    http::interaction::{InteractionResponse, InteractionResponseType},
};
use twilight_util::builder::InteractionResponseDataBuilder;

use super::action_menu;
use crate::command_handler::StateExt;
use crate::state::State;

/// Toggles the player and swaps the button label to match.
pub async fn pause_button_handler(state: Arc<State>, interaction: Interaction) -> anyhow::Result<()> {
    let guild_id = interaction
        .guild_id
        .ok_or_else(|| anyhow::anyhow!("Interaction must be in a guild to pause the player"))?;

    let player = state
        .lavalink()
        .get_player_context(guild_id)
        .ok_or_else(|| anyhow::anyhow!("No player found for guild: {}", guild_id))?;
    let paused = !player.get_player().await?.paused;
    player.set_pause(paused).await?;
    tracing::debug!(%guild_id, paused, "Pause button pressed");

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
                        .components(vec![action_menu(paused)])
                        .build(),
                ),
            },
        )
        .await?;

    Ok(())
}
