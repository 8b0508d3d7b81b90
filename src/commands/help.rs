use std::fmt::Write;

use anyhow::Result;
use async_trait::async_trait;
use twilight_interactions::command::{CommandModel, CreateCommand};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder};

use crate::command_handler::{
    Command, CommandContext, CommandDefinition, CommandResponseBuilder, GlobalState,
};

#[derive(CommandModel, CreateCommand)]
#[command(name = "help", desc = "Show the help menu for commands.")]
pub struct HelpCommand;

fn describe<S>(command_def: &CommandDefinition<S>) -> (String, String) {
    let slash_command = (command_def.create_slash_data_fn)();
    let mut description = format!("```{}", slash_command.description);

    if !slash_command.options.is_empty() {
        description.push_str("\n\nArguments:");
        for option in &slash_command.options {
            let requirement = if option.required.unwrap_or(false) {
                "required"
            } else {
                "optional"
            };
            let _ = write!(
                description,
                "\n{} ({requirement}): {}",
                option.name, option.description
            );
        }
    }
    if !command_def.aliases.is_empty() {
        let _ = write!(description, "\n\nAliases: {}", command_def.aliases.join(", "));
    }
    description.push_str("```");

    (format!("/{}", slash_command.name), description)
}

#[async_trait]
impl Command<GlobalState> for HelpCommand {
    async fn execute<'ctx>(state: GlobalState, cmd_ctx: CommandContext<'ctx>) -> Result<()> {
        let mut embed_builder = EmbedBuilder::new()
            .title("Bahamut Help")
            .description(format!(
                "Slash commands, or `{}` followed by the command name.",
                state.config.configured_prefix
            ))
            .color(0x1DB954);

        for command_def in state.commands.iter() {
            let (name, description) = describe(command_def);
            embed_builder = embed_builder.field(EmbedFieldBuilder::new(name, description));
        }

        cmd_ctx
            .reply(CommandResponseBuilder::new().embed(embed_builder.build()).build())
            .await?;
        Ok(())
    }
}
