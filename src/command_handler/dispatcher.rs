use twilight_model::{
    application::interaction::{Interaction, application_command::CommandData},
    channel::Message,
};

use crate::command_handler::definition::{CommandDefinition, GlobalState};

/// Lookup table from command names and aliases to their executors, built once at startup.
pub struct CommandRegistry<S> {
    commands: Vec<CommandDefinition<S>>,
}

impl<S> CommandRegistry<S> {
    pub fn new(commands: Vec<CommandDefinition<S>>) -> Self {
        for (index, command) in commands.iter().enumerate() {
            let clashes = commands[..index]
                .iter()
                .filter(|other| {
                    other.answers_to(command.name)
                        || command.aliases.iter().any(|alias| other.answers_to(alias))
                })
                .count();
            if clashes > 0 {
                tracing::warn!(command = command.name, "Command name or alias registered twice");
            }
        }
        Self { commands }
    }

    pub fn find(&self, name: &str) -> Option<&CommandDefinition<S>> {
        self.commands.iter().find(|cmd_def| cmd_def.name == name)
    }

    /// Prefix invocations also match aliases.
    pub fn find_prefix(&self, name: &str) -> Option<&CommandDefinition<S>> {
        self.commands.iter().find(|cmd_def| cmd_def.answers_to(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition<S>> {
        self.commands.iter()
    }

    pub fn slash_commands(&self) -> Vec<twilight_model::application::command::Command> {
        self.commands
            .iter()
            .map(|cmd_def| (cmd_def.create_slash_data_fn)())
            .collect()
    }
}

pub async fn slash_handler(
    interaction: Interaction,
    data: CommandData,
    state: GlobalState,
) -> anyhow::Result<()> {
    let Some(cmd_def) = state.commands.find(data.name.as_str()) else {
        tracing::warn!("Unknown slash command: {}", data.name);
        return Ok(());
    };
    (cmd_def.slash_executor)(state.clone(), interaction, data).await
}

pub async fn autocomplete_handler(
    interaction: Interaction,
    data: CommandData,
    state: GlobalState,
) -> anyhow::Result<()> {
    let Some(cmd_def) = state.commands.find(data.name.as_str()) else {
        tracing::warn!("Autocomplete for unknown command: {}", data.name);
        return Ok(());
    };
    (cmd_def.autocomplete_executor)(state.clone(), interaction, data).await
}

pub async fn prefix_handler(
    message: Message,
    configured_prefix: &str,
    state: GlobalState,
) -> anyhow::Result<()> {
    if message.author.bot {
        return Ok(());
    }

    let Some(parsed_command) = crate::prefix_parser::parse(&message.content, configured_prefix)
    else {
        return Ok(());
    };

    let command_name = parsed_command.command;
    match state.commands.find_prefix(command_name) {
        Some(cmd_def) => {
            (cmd_def.prefix_executor)(
                state.clone(),
                &message,
                parsed_command.arguments(),
                configured_prefix.to_string(),
            )
            .await
        }
        None => {
            tracing::debug!(
                "Unknown prefix command: {} from user: {}",
                command_name,
                message.author.name
            );
            Ok(())
        }
    }
}
