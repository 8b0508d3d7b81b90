#![warn(clippy::all, clippy::pedantic)]

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod command_handler;
pub mod commands;
pub mod components;
pub mod config;
pub mod gateway;
pub mod lavalink_events;
pub mod prefix_parser;
pub mod state;
pub mod uplink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    print_banner();
    crate::gateway::initialize_and_run_bot().await
}

const BANNER: &str = r"
 _           _                           _
| |__   __ _| |__   __ _ _ __ ___  _   _| |_
| '_ \ / _` | '_ \ / _` | '_ ` _ \| | | | __|
| |_) | (_| | | | | (_| | | | | | | |_| | |_
|_.__/ \__,_|_| |_|\__,_|_| |_| |_|\__,_|\__|

Bahamut - sharded music bot
";

fn print_banner() {
    let git_hash = env!("GIT_HASH");
    let build_time = env!("BUILD_TIME");
    let version = env!("APP_VERSION");

    println!("{BANNER}");
    println!("  Version   : {version}");
    println!("  Commit    : {git_hash}");
    println!("  Built at  : {build_time}");
    println!("--------------------------------------------------------------\n");
}
