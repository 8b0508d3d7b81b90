use anyhow::Result;
use async_trait::async_trait;
use lavalink_rs::player_context::QueueRef;
use twilight_interactions::command::{CommandModel, CreateCommand};
use twilight_model::channel::message::Embed;
use twilight_util::builder::embed::EmbedBuilder;

use super::{format_millis, player};
use crate::command_handler::{
    Command, CommandContext, CommandResponseBuilder, GlobalState, Precheck,
};

const QUEUE_PAGE_SIZE: usize = 10;

#[derive(CommandModel, CreateCommand)]
#[command(name = "queue", desc = "Show the current music queue.")]
pub struct QueueCommand;

#[async_trait]
impl Command<GlobalState> for QueueCommand {
    const PRECHECKS: &'static [Precheck] = &[Precheck::GuildOnly];

    async fn execute<'ctx>(state: GlobalState, cmd_ctx: CommandContext<'ctx>) -> Result<()> {
        let player = player(&state, cmd_ctx.require_guild()?)?;
        let embed = build_queue_embed(&player.get_queue()).await?;

        cmd_ctx
            .reply(CommandResponseBuilder::new().embed(embed).build())
            .await?;
        Ok(())
    }
}

pub async fn build_queue_embed(queue: &QueueRef) -> Result<Embed> {
    let entries: Vec<String> = queue
        .get_queue()
        .await?
        .iter()
        .map(|entry| {
            let info = &entry.track.info;
            format!("{} - {} `[{}]`", info.title, info.author, format_millis(info.length))
        })
        .collect();

    Ok(EmbedBuilder::new()
        .title("🎶 Current Queue")
        .color(0x1DB954)
        .description(describe_queue(&entries))
        .build())
}

fn describe_queue(entries: &[String]) -> String {
    if entries.is_empty() {
        return "The queue is currently empty.".to_string();
    }

    let mut lines: Vec<String> = entries
        .iter()
        .take(QUEUE_PAGE_SIZE)
        .enumerate()
        .map(|(index, entry)| format!("`{}.` {entry}", index + 1))
        .collect();
    if entries.len() > QUEUE_PAGE_SIZE {
        lines.push(format!("…and {} more", entries.len() - QUEUE_PAGE_SIZE));
    }
    lines.join("\n")
}
