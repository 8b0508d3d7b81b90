use twilight_http::Client as HttpClient;
use twilight_model::{
    application::interaction::Interaction,
    channel::message::MessageFlags,
    http::interaction::{InteractionResponse, InteractionResponseType},
};
use twilight_util::builder::InteractionResponseDataBuilder;

/// How a slash command acknowledges its interaction before running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeferMode {
    /// Reply directly; the command must answer within Discord's 3 second window.
    #[default]
    None,
    /// Show "thinking…" publicly, then edit the original response.
    Normal,
    /// Same as `Normal`, visible only to the invoking user.
    Ephemeral,
}

impl DeferMode {
    pub fn is_deferred(self) -> bool {
        self != DeferMode::None
    }

    pub fn response(self) -> Option<InteractionResponse> {
        let data = match self {
            DeferMode::None => return None,
            DeferMode::Normal => None,
            DeferMode::Ephemeral => Some(
                InteractionResponseDataBuilder::new()
                    .flags(MessageFlags::EPHEMERAL)
                    .build(),
            ),
        };

        Some(InteractionResponse {
            kind: InteractionResponseType::DeferredChannelMessageWithSource,
            data,
        })
    }

    /// Sends the deferred acknowledgement, if any. Returns whether the interaction was deferred.
    pub async fn acknowledge(
        self,
        http: &HttpClient,
        interaction: &Interaction,
    ) -> anyhow::Result<bool> {
        let Some(response) = self.response() else {
            return Ok(false);
        };

        http.interaction(interaction.application_id)
            .create_response(interaction.id, &interaction.token, &response)
            .await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_sends_nothing() {
        assert!(DeferMode::None.response().is_none());
        assert!(!DeferMode::None.is_deferred());
    }

    #[test]
    fn test_normal_defers_publicly() {
        let response = DeferMode::Normal.response().unwrap();
        assert_eq!(
            response.kind,
            InteractionResponseType::DeferredChannelMessageWithSource
        );
        assert!(response.data.is_none());
    }

    #[test]
    fn test_ephemeral_sets_flag() {
        let response = DeferMode::Ephemeral.response().unwrap();
        assert_eq!(
            response.kind,
            InteractionResponseType::DeferredChannelMessageWithSource
        );
        assert_eq!(response.data.unwrap().flags, Some(MessageFlags::EPHEMERAL));
    }
}
