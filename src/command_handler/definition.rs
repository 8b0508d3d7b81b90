use std::{future::Future, pin::Pin, sync::Arc};

use lavalink_rs::client::LavalinkClient;
use songbird::Songbird;
use twilight_cache_inmemory::DefaultInMemoryCache;
use twilight_http::Client as HttpClient;
use twilight_interactions::command::CreateCommand;
use twilight_model::{
    application::{
        command::{CommandOptionChoice, CommandOptionChoiceValue},
        interaction::{Interaction, application_command::CommandData},
    },
    channel::Message,
    http::interaction::{InteractionResponse, InteractionResponseType},
};
use twilight_util::builder::InteractionResponseDataBuilder;

use super::context::{AutocompleteContext, CommandContext, PrefixContext, SlashContext};
use super::defer::DeferMode;
use super::precheck::{self, Precheck};
use super::response::create_error_response;
use crate::{prefix_parser::Arguments, state::State};

pub type GlobalStateInner = State;
pub type GlobalState = Arc<GlobalStateInner>;

/// Discord rejects autocomplete results above these limits.
pub const MAX_AUTOCOMPLETE_CHOICES: usize = 25;
pub const MAX_CHOICE_LENGTH: usize = 100;

pub type CommandFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

#[async_trait::async_trait]
pub trait Command<S>: CreateCommand
where
    S: StateExt + Clone + Send + Sync + 'static + Sized,
{
    const DEFER: DeferMode = DeferMode::None;
    const PRECHECKS: &'static [Precheck] = &[];

    async fn execute<'ctx>(state: S, cmd_ctx: CommandContext<'ctx>) -> anyhow::Result<()>;

    /// Suggestions for the option currently being typed.
    async fn autocomplete(_state: S, _ctx: AutocompleteContext) -> anyhow::Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn execute_prefix_command<'msg_lifetime>(
        state: S,
        message_ref: &'msg_lifetime Message,
        arguments: Arguments<'msg_lifetime>,
        prefix_str: String,
    ) -> anyhow::Result<()> {
        let cmd_ctx = CommandContext::Prefix(Box::new(PrefixContext::new(
            message_ref,
            arguments.clone(),
            prefix_str.clone(),
            state.http_client(),
        )));

        let result = match precheck::run_all(&state, &cmd_ctx, Self::PRECHECKS) {
            Ok(()) => Self::execute(state.clone(), cmd_ctx).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            let error_cmd_ctx = CommandContext::Prefix(Box::new(PrefixContext::new(
                message_ref,
                arguments,
                prefix_str,
                state.http_client(),
            )));
            if let Err(reply_err) = error_cmd_ctx.reply_error(&e, create_error_response).await {
                tracing::error!(error = ?reply_err, "Failed to send error embed for prefix command");
            }
        }
        Ok(())
    }

    async fn execute_slash_command(
        state: S,
        interaction: Interaction,
        data: CommandData,
    ) -> anyhow::Result<()> {
        let deferred = Self::DEFER
            .acknowledge(&state.http_client(), &interaction)
            .await?;

        let interaction_for_error_reply = interaction.clone();
        let data_for_error_reply = data.clone();

        let cmd_ctx = CommandContext::Slash(Box::new(SlashContext {
            interaction,
            data,
            http_client: state.http_client(),
            deferred,
        }));

        let result = match precheck::run_all(&state, &cmd_ctx, Self::PRECHECKS) {
            Ok(()) => Self::execute(state.clone(), cmd_ctx).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            let error_cmd_ctx = CommandContext::Slash(Box::new(SlashContext {
                interaction: interaction_for_error_reply,
                data: data_for_error_reply,
                http_client: state.http_client(),
                deferred,
            }));
            if let Err(reply_err) = error_cmd_ctx.reply_error(&e, create_error_response).await {
                tracing::error!(error = ?reply_err, "Failed to send error embed for slash command");
            }
        }
        Ok(())
    }

    async fn execute_autocomplete(
        state: S,
        interaction: Interaction,
        data: CommandData,
    ) -> anyhow::Result<()> {
        let suggestions = match AutocompleteContext::from_command_data(&interaction, &data) {
            Some(ctx) => Self::autocomplete(state.clone(), ctx)
                .await
                .unwrap_or_else(|error| {
                    tracing::warn!(?error, command = %data.name, "Autocomplete failed");
                    Vec::new()
                }),
            None => Vec::new(),
        };

        let response = InteractionResponse {
            kind: InteractionResponseType::ApplicationCommandAutocompleteResult,
            data: Some(
                InteractionResponseDataBuilder::new()
                    .choices(autocomplete_choices(suggestions))
                    .build(),
            ),
        };

        state
            .http_client()
            .interaction(interaction.application_id)
            .create_response(interaction.id, &interaction.token, &response)
            .await?;
        Ok(())
    }
}

pub fn autocomplete_choices(suggestions: Vec<String>) -> Vec<CommandOptionChoice> {
    suggestions
        .into_iter()
        .filter(|suggestion| !suggestion.trim().is_empty())
        .take(MAX_AUTOCOMPLETE_CHOICES)
        .map(|suggestion| {
            let value: String = suggestion.chars().take(MAX_CHOICE_LENGTH).collect();
            CommandOptionChoice {
                name: value.clone(),
                name_localizations: None,
                value: CommandOptionChoiceValue::String(value),
            }
        })
        .collect()
}

/// One entry of the registration table.
pub struct CommandDefinition<S> {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub create_slash_data_fn: fn() -> twilight_model::application::command::Command,
    pub slash_executor: fn(S, Interaction, CommandData) -> CommandFuture<'static>,
    pub autocomplete_executor: fn(S, Interaction, CommandData) -> CommandFuture<'static>,
    pub prefix_executor: for<'msg_lifetime> fn(
        S,
        &'msg_lifetime Message,
        Arguments<'msg_lifetime>,
        String,
    ) -> CommandFuture<'msg_lifetime>,
}

impl<S> CommandDefinition<S> {
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|alias| *alias == name)
    }
}

#[macro_export]
macro_rules! command_def {
    ($state_type:ty, $command_type:ty) => {
        $crate::command_def!($state_type, $command_type, aliases = [])
    };
    ($state_type:ty, $command_type:ty, aliases = [$($alias:expr),* $(,)?]) => {
        $crate::command_handler::CommandDefinition::<$state_type> {
            name: <$command_type as twilight_interactions::command::CreateCommand>::NAME,
            aliases: &[$($alias),*],
            create_slash_data_fn: || <$command_type as twilight_interactions::command::CreateCommand>::create_command().into(),
            slash_executor: |state, interaction, data| {
                Box::pin(<$command_type as $crate::command_handler::Command<$state_type>>::execute_slash_command(state, interaction, data))
            },
            autocomplete_executor: |state, interaction, data| {
                Box::pin(<$command_type as $crate::command_handler::Command<$state_type>>::execute_autocomplete(state, interaction, data))
            },
            prefix_executor: |state, message, args, prefix_str| {
                Box::pin(<$command_type as $crate::command_handler::Command<$state_type>>::execute_prefix_command(state, message, args, prefix_str))
            },
        }
    };
}

pub trait HasHttpClient {
    fn http_client(&self) -> Arc<HttpClient>;
}

pub trait StateExt: HasHttpClient {
    fn lavalink(&self) -> Arc<LavalinkClient>;
    fn songbird(&self) -> Arc<Songbird>;
    fn cache(&self) -> Arc<DefaultInMemoryCache>;
}
