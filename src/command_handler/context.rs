use std::str::FromStr;
use std::sync::Arc;

use twilight_http::Client as HttpClient;
use twilight_model::{
    application::interaction::{
        Interaction,
        application_command::{CommandData, CommandOptionValue},
    },
    channel::Message,
    id::{
        Id,
        marker::{ChannelMarker, GuildMarker, MessageMarker},
    },
    user::User,
};

use crate::command_handler::response::CommandResponse;
use crate::prefix_parser::Arguments;

/// Typed access to a slash command option.
pub trait FromCommandOptionValue: Sized {
    fn from_option_value(value: &CommandOptionValue) -> Option<Self>;
}

impl FromCommandOptionValue for String {
    fn from_option_value(value: &CommandOptionValue) -> Option<Self> {
        match value {
            CommandOptionValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromCommandOptionValue for i64 {
    fn from_option_value(value: &CommandOptionValue) -> Option<Self> {
        match value {
            CommandOptionValue::Integer(i) => Some(*i),
            CommandOptionValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl FromCommandOptionValue for bool {
    fn from_option_value(value: &CommandOptionValue) -> Option<Self> {
        match value {
            CommandOptionValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

pub struct PrefixContext<'a> {
    pub message_id: Id<MessageMarker>,
    pub channel_id: Id<ChannelMarker>,
    pub message: &'a Message,
    pub parsed: Arguments<'a>,
    pub prefix: String,
    pub http_client: Arc<HttpClient>,
}

impl<'a> PrefixContext<'a> {
    pub fn new(
        message: &'a Message,
        parsed: Arguments<'a>,
        prefix: String,
        http_client: Arc<HttpClient>,
    ) -> Self {
        Self {
            message_id: message.id,
            channel_id: message.channel_id,
            message,
            parsed,
            prefix,
            http_client,
        }
    }

    pub async fn reply(&self, response: CommandResponse) -> anyhow::Result<Message> {
        let mut create_message = self
            .http_client
            .create_message(self.channel_id)
            .reply(self.message_id);

        if !response.content.is_empty() {
            create_message = create_message.content(&response.content);
        }
        if !response.embeds.is_empty() {
            create_message = create_message.embeds(&response.embeds);
        }
        if !response.components.is_empty() {
            create_message = create_message.components(&response.components);
        }

        Ok(create_message.await?.model().await?)
    }
}

pub struct SlashContext {
    pub interaction: Interaction,
    pub data: CommandData,
    pub http_client: Arc<HttpClient>,
    /// Set when the interaction was acknowledged with a deferred response.
    pub deferred: bool,
}

impl SlashContext {
    pub async fn reply(&self, response: CommandResponse) -> anyhow::Result<Message> {
        let interaction_client = self
            .http_client
            .interaction(self.interaction.application_id);

        if self.deferred {
            let mut update = interaction_client.update_response(&self.interaction.token);
            if !response.content.is_empty() {
                update = update.content(Some(response.content.as_str()));
            }
            if !response.embeds.is_empty() {
                update = update.embeds(Some(response.embeds.as_slice()));
            }
            if !response.components.is_empty() {
                update = update.components(Some(response.components.as_slice()));
            }
            return Ok(update.await?.model().await?);
        }

        interaction_client
            .create_response(
                self.interaction.id,
                &self.interaction.token,
                &response.into(),
            )
            .await?;

        Ok(interaction_client
            .response(&self.interaction.token)
            .await?
            .model()
            .await?)
    }

    /// Sends an additional message after the interaction was already answered.
    pub async fn follow_up(&self, response: CommandResponse) -> anyhow::Result<Message> {
        let interaction_client = self
            .http_client
            .interaction(self.interaction.application_id);
        let mut followup = interaction_client.create_followup(&self.interaction.token);

        if !response.content.is_empty() {
            followup = followup.content(&response.content);
        }
        if !response.embeds.is_empty() {
            followup = followup.embeds(&response.embeds);
        }
        if !response.components.is_empty() {
            followup = followup.components(&response.components);
        }
        if response.ephemeral {
            followup = followup.flags(twilight_model::channel::message::MessageFlags::EPHEMERAL);
        }

        Ok(followup.await?.model().await?)
    }
}

pub enum CommandContext<'ctx> {
    Prefix(Box<PrefixContext<'ctx>>),
    Slash(Box<SlashContext>),
}

impl CommandContext<'_> {
    pub async fn reply(&self, response: CommandResponse) -> anyhow::Result<Message> {
        match self {
            CommandContext::Prefix(prefix_ctx) => prefix_ctx.reply(response).await,
            CommandContext::Slash(slash_ctx) => slash_ctx.reply(response).await,
        }
    }

    pub async fn reply_error(
        &self,
        error: &anyhow::Error,
        create_error_fn: impl Fn(&anyhow::Error) -> CommandResponse,
    ) -> anyhow::Result<()> {
        tracing::error!(error = ?error, "Command execution failed");
        let error_response = create_error_fn(error);

        match self {
            CommandContext::Prefix(prefix_ctx) => {
                prefix_ctx.reply(error_response).await?;
            }
            // The command may already have answered the interaction; fall back to a followup.
            CommandContext::Slash(slash_ctx) => {
                if let Err(reply_err) = slash_ctx.reply(error_response.clone()).await {
                    tracing::debug!(error = ?reply_err, "Initial response unavailable, sending followup");
                    slash_ctx.follow_up(error_response).await?;
                }
            }
        }
        Ok(())
    }

    pub fn get_arg<T>(&mut self, name: &str) -> Option<T>
    where
        T: FromStr + FromCommandOptionValue,
    {
        match self {
            CommandContext::Prefix(prefix_ctx) => {
                let raw = prefix_ctx.parsed.next()?;
                let parsed = raw.parse::<T>().ok();
                if parsed.is_none() {
                    tracing::debug!(argument = name, raw, "Failed to parse prefix argument");
                }
                parsed
            }
            CommandContext::Slash(slash_ctx) => slash_ctx
                .data
                .options
                .iter()
                .find(|opt| opt.name == name)
                .and_then(|opt| T::from_option_value(&opt.value)),
        }
    }

    /// For prefix commands everything after the command name, for slash commands the named option.
    pub fn get_remainder_arg(&mut self, name: &str) -> Option<String> {
        match self {
            CommandContext::Prefix(prefix_ctx) => {
                let remainder = prefix_ctx.parsed.remainder().to_string();
                prefix_ctx.parsed.by_ref().for_each(drop);
                (!remainder.is_empty()).then_some(remainder)
            }
            CommandContext::Slash(_) => self.get_arg(name),
        }
    }

    pub fn author(&self) -> Option<&User> {
        match self {
            CommandContext::Prefix(prefix_ctx) => Some(&prefix_ctx.message.author),
            CommandContext::Slash(slash_ctx) => slash_ctx.interaction.author(),
        }
    }

    pub fn guild_id(&self) -> Option<Id<GuildMarker>> {
        match self {
            CommandContext::Prefix(prefix_ctx) => prefix_ctx.message.guild_id,
            CommandContext::Slash(slash_ctx) => slash_ctx.interaction.guild_id,
        }
    }

    pub fn require_guild(&self) -> anyhow::Result<Id<GuildMarker>> {
        self.guild_id()
            .ok_or_else(|| anyhow::anyhow!("This command must be used in a guild."))
    }

    pub fn require_author(&self) -> anyhow::Result<&User> {
        self.author()
            .ok_or_else(|| anyhow::anyhow!("Interaction is missing author information."))
    }
}

/// The option a user is currently typing into.
#[derive(Debug, Clone)]
pub struct AutocompleteContext {
    pub guild_id: Option<Id<GuildMarker>>,
    pub option: String,
    pub partial: String,
}

impl AutocompleteContext {
    pub fn from_command_data(interaction: &Interaction, data: &CommandData) -> Option<Self> {
        data.options.iter().find_map(|opt| match &opt.value {
            CommandOptionValue::Focused(partial, _) => Some(Self {
                guild_id: interaction.guild_id,
                option: opt.name.clone(),
                partial: partial.clone(),
            }),
            _ => None,
        })
    }
}
