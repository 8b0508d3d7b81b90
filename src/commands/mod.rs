pub mod help;
pub mod music;
pub mod ping;
pub mod status;

use crate::{
    command_def,
    command_handler::{CommandRegistry, GlobalState},
};

use help::HelpCommand;
use music::*;
use ping::PingCommand;
use status::StatusCommand;

/// The registration table. Built once at startup and stored in the shared state.
pub fn build_registry() -> CommandRegistry<GlobalState> {
    CommandRegistry::new(vec![
        command_def!(GlobalState, PingCommand),
        command_def!(GlobalState, HelpCommand),
        command_def!(GlobalState, StatusCommand),
        command_def!(GlobalState, PlayCommand, aliases = ["p"]),
        command_def!(GlobalState, SkipCommand, aliases = ["s"]),
        command_def!(GlobalState, StopCommand, aliases = ["st", "leave"]),
        command_def!(GlobalState, PauseCommand, aliases = ["resume"]),
        command_def!(GlobalState, QueueCommand, aliases = ["q"]),
        command_def!(GlobalState, NowPlayingCommand, aliases = ["np", "nowplaying"]),
        command_def!(GlobalState, VolumeCommand, aliases = ["vol"]),
    ])
}
