use std::sync::Arc;

use lavalink_rs::client::LavalinkClient;
use songbird::Songbird;
use twilight_cache_inmemory::DefaultInMemoryCache;
use twilight_http::Client as HttpClient;

use crate::command_handler::{CommandRegistry, GlobalState, HasHttpClient, StateExt};
use crate::components::ComponentRegistry;
use crate::config::Config;
use crate::gateway::ShardStatsRegistry;
use crate::uplink::HeartbeatController;

pub struct State {
    pub http: Arc<HttpClient>,
    pub cache: Arc<DefaultInMemoryCache>,
    pub lavalink: Arc<LavalinkClient>,
    pub songbird: Arc<Songbird>,
    pub config: Config,
    pub commands: CommandRegistry<GlobalState>,
    pub components: ComponentRegistry,
    pub shard_stats: Arc<ShardStatsRegistry>,
    pub uplink: HeartbeatController,
}

impl HasHttpClient for GlobalState {
    fn http_client(&self) -> Arc<HttpClient> {
        self.http.clone()
    }
}

impl StateExt for GlobalState {
    fn lavalink(&self) -> Arc<LavalinkClient> {
        self.lavalink.clone()
    }

    fn songbird(&self) -> Arc<Songbird> {
        self.songbird.clone()
    }

    fn cache(&self) -> Arc<DefaultInMemoryCache> {
        self.cache.clone()
    }
}
