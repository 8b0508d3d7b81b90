use std::sync::Arc;

use twilight_gateway::Event;
use twilight_model::application::interaction::{InteractionData, InteractionType};

use crate::state::State;

pub async fn process(event: Event, state: Arc<State>) -> anyhow::Result<()> {
    match event {
        Event::InteractionCreate(interaction_payload) => {
            let mut interaction = interaction_payload.0;
            let kind = interaction.kind;

            match std::mem::take(&mut interaction.data) {
                Some(InteractionData::ApplicationCommand(data))
                    if kind == InteractionType::ApplicationCommandAutocomplete =>
                {
                    if let Err(e) =
                        crate::command_handler::autocomplete_handler(interaction, *data, state)
                            .await
                    {
                        tracing::error!(error = ?e, "Error handling autocomplete");
                    }
                }
                Some(InteractionData::ApplicationCommand(data)) => {
                    if let Err(e) =
                        crate::command_handler::slash_handler(interaction, *data, state).await
                    {
                        tracing::error!(error = ?e, "Error handling slash command");
                    }
                }
                Some(InteractionData::MessageComponent(data)) => {
                    if let Err(e) = state
                        .components
                        .handle(state.clone(), interaction, *data)
                        .await
                    {
                        tracing::error!(error = ?e, "Error handling component interaction");
                    }
                }
                _ => {
                    tracing::warn!(?kind, "Ignoring unsupported interaction");
                }
            }
        }
        Event::MessageCreate(message_payload) => {
            let message = message_payload.0;
            if message.author.bot {
                return Ok(());
            }

            let prefix = state.config.configured_prefix.clone();
            if let Err(e) =
                crate::command_handler::prefix_handler(message, &prefix, state.clone()).await
            {
                tracing::error!(error = ?e, "Error handling prefix command");
            }
        }
        _ => {}
    }
    Ok(())
}
