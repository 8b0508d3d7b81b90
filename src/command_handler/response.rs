use chrono::Utc;
use twilight_model::{
    channel::message::{Component, Embed, MessageFlags},
    http::interaction::{InteractionResponse, InteractionResponseData, InteractionResponseType},
    util::Timestamp,
};
use twilight_util::builder::embed::EmbedBuilder;

pub const ERROR_COLOR: u32 = 0xdd7878;

#[derive(Default, Clone, Debug)]
pub struct CommandResponse {
    pub embeds: Vec<Embed>,
    pub content: String,
    pub components: Vec<Component>,
    /// Only honoured for interactions; prefix replies are always public.
    pub ephemeral: bool,
}

impl CommandResponse {
    pub fn into_data(self) -> InteractionResponseData {
        InteractionResponseData {
            content: (!self.content.is_empty()).then_some(self.content),
            embeds: (!self.embeds.is_empty()).then_some(self.embeds),
            components: (!self.components.is_empty()).then_some(self.components),
            flags: self.ephemeral.then_some(MessageFlags::EPHEMERAL),
            ..Default::default()
        }
    }
}

impl From<CommandResponse> for InteractionResponse {
    fn from(val: CommandResponse) -> Self {
        InteractionResponse {
            kind: InteractionResponseType::ChannelMessageWithSource,
            data: Some(val.into_data()),
        }
    }
}

#[derive(Default)]
pub struct CommandResponseBuilder {
    response: CommandResponse,
}

impl CommandResponseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.response.embeds.push(embed);
        self
    }

    pub fn content<S: Into<String>>(mut self, content: S) -> Self {
        self.response.content = content.into();
        self
    }

    pub fn component(mut self, component: Component) -> Self {
        self.response.components.push(component);
        self
    }

    pub fn ephemeral(mut self) -> Self {
        self.response.ephemeral = true;
        self
    }

    pub fn build(self) -> CommandResponse {
        self.response
    }
}

pub fn create_error_response(error: &anyhow::Error) -> CommandResponse {
    let mut embed = EmbedBuilder::new()
        .title("Command Error")
        .description(format!(
            "I ran into a problem trying to do that:\n```\n{error}```"
        ))
        .color(ERROR_COLOR);

    match Timestamp::from_secs(Utc::now().timestamp()) {
        Ok(timestamp) => embed = embed.timestamp(timestamp),
        Err(e) => tracing::warn!(error = ?e, "Failed to build timestamp for error embed"),
    }

    CommandResponseBuilder::new()
        .embed(embed.build())
        .ephemeral()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_parts_are_omitted() {
        let data = CommandResponseBuilder::new().content("hi").build().into_data();
        assert_eq!(data.content.as_deref(), Some("hi"));
        assert!(data.embeds.is_none());
        assert!(data.components.is_none());
        assert!(data.flags.is_none());
    }

    #[test]
    fn test_error_response_is_ephemeral_embed() {
        let response = create_error_response(&anyhow::anyhow!("boom"));
        assert!(response.ephemeral);
        assert!(response.content.is_empty());
        let embed = &response.embeds[0];
        assert_eq!(embed.color, Some(ERROR_COLOR));
        assert!(embed.description.as_deref().unwrap().contains("boom"));

        let data = response.into_data();
        assert_eq!(data.flags, Some(MessageFlags::EPHEMERAL));
    }
}
