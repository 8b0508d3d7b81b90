use std::sync::Arc;

use anyhow::Context;
use lavalink_rs::client::LavalinkClient;
use lavalink_rs::model::events as LavalinkEventsModel;
use lavalink_rs::node::NodeBuilder;
use lavalink_rs::prelude::NodeDistributionStrategy;
use songbird::Songbird;
use songbird::shards::TwilightMap;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use twilight_cache_inmemory::{DefaultInMemoryCache, ResourceType};
use twilight_http::Client as HttpClient;
use twilight_model::gateway::payload::outgoing::update_presence::UpdatePresencePayload;
use twilight_model::gateway::presence::{ActivityType, MinimalActivity, Status};
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

use super::ShardManager;
use crate::config::Config;
use crate::lavalink_events;
use crate::state::State;
use crate::uplink::{self, BootConfig, HeartbeatController};

fn init_tracing() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global default tracing subscriber: {}", e))?;
    Ok(())
}

fn load_config_and_env_sync() -> anyhow::Result<Config> {
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }
    Config::from_env()
}

fn presence() -> anyhow::Result<UpdatePresencePayload> {
    Ok(UpdatePresencePayload::new(
        [MinimalActivity {
            name: "music".to_string(),
            kind: ActivityType::Listening,
            url: None,
        }
        .into()],
        false,
        None,
        Status::Online,
    )?)
}

/// Applies the settings the control plane overrides.
fn apply_boot_config(config: &mut Config, boot_config: &BootConfig) {
    if let Some(prefix) = boot_config
        .prefix
        .as_deref()
        .filter(|prefix| !prefix.trim().is_empty())
    {
        config.configured_prefix = prefix.to_string();
    }
}

fn init_cache() -> Arc<DefaultInMemoryCache> {
    Arc::new(
        DefaultInMemoryCache::builder()
            .resource_types(
                ResourceType::GUILD
                    | ResourceType::CHANNEL
                    | ResourceType::VOICE_STATE
                    | ResourceType::USER_CURRENT,
            )
            .build(),
    )
}

async fn init_lavalink_client(
    config: &Config,
    user_id: Id<UserMarker>,
) -> anyhow::Result<Arc<LavalinkClient>> {
    let lavalink_events_handlers = LavalinkEventsModel::Events {
        ready: Some(lavalink_events::ready_event),
        track_start: Some(lavalink_events::track_start),
        track_exception: Some(lavalink_events::track_exception),
        ..Default::default()
    };

    let node_local = NodeBuilder {
        hostname: format!("{}:{}", config.lavalink_host, config.lavalink_port),
        is_ssl: false,
        events: LavalinkEventsModel::Events::default(),
        password: config.lavalink_password.clone(),
        user_id: user_id.into(),
        session_id: None,
    };

    let client = LavalinkClient::new(
        lavalink_events_handlers,
        vec![node_local],
        NodeDistributionStrategy::round_robin(),
    )
    .await;
    Ok(Arc::new(client))
}

async fn register_bot_commands(state: &State) -> anyhow::Result<()> {
    let commands_to_register = state.commands.slash_commands();

    if commands_to_register.is_empty() {
        tracing::info!("No commands to register.");
        return Ok(());
    }

    let application_id = state
        .http
        .current_user_application()
        .await
        .context("Failed to get current user application")?
        .model()
        .await
        .context("Failed to model current user application")?
        .id;

    match state
        .http
        .interaction(application_id)
        .set_global_commands(&commands_to_register)
        .await
    {
        Ok(_) => {
            tracing::info!(
                count = commands_to_register.len(),
                "Successfully registered global commands."
            );
        }
        Err(error) => {
            tracing::error!(?error, "Failed to register global commands");
        }
    }
    Ok(())
}

/// Probes the control plane and fetches the boot configuration.
///
/// `None` means startup cannot continue; the reason has been logged.
async fn negotiate_boot(config: &Config) -> Option<(HeartbeatController, BootConfig)> {
    let controller = match uplink::controller_from_config(&config.uplink) {
        Ok(controller) => controller,
        Err(error) => {
            tracing::error!(%error, "Cannot create the uplink controller");
            return None;
        }
    };

    match uplink::negotiate(&controller).await {
        Ok(boot_config) => Some((controller, boot_config)),
        Err(error) => {
            tracing::error!(%error, "Boot negotiation failed, shutting down");
            None
        }
    }
}

pub async fn initialize_and_run_bot() -> anyhow::Result<()> {
    init_tracing().context("Failed to initialize tracing")?;
    tracing::info!("Bahamut shard starting up...");

    let mut config =
        load_config_and_env_sync().context("Failed to load configuration and .env file")?;

    let Some((controller, boot_config)) = negotiate_boot(&config).await else {
        return Ok(());
    };
    apply_boot_config(&mut config, &boot_config);

    let token = boot_config.bot_token()?.to_string();
    let http_client = Arc::new(HttpClient::new(token.clone()));

    let current_user_id = http_client
        .current_user()
        .await
        .context("Failed to get current user from Discord")?
        .model()
        .await
        .context("Failed to model current user data")?
        .id;

    let lavalink_client = init_lavalink_client(&config, current_user_id)
        .await
        .context("Failed to initialize Lavalink client")?;

    let shard_manager = ShardManager::new(&token, &boot_config, &presence()?)
        .context("Failed to create shards")?;
    let songbird_client = Arc::new(Songbird::twilight(
        Arc::new(TwilightMap::new(shard_manager.senders())),
        current_user_id,
    ));

    let shard_stats = shard_manager.stats();
    controller.attach_stats(shard_stats.clone());

    let app_state = Arc::new(State {
        http: http_client,
        cache: init_cache(),
        lavalink: lavalink_client,
        songbird: songbird_client,
        config,
        commands: crate::commands::build_registry(),
        components: crate::components::build_registry(),
        shard_stats,
        uplink: controller.clone(),
    });

    register_bot_commands(&app_state)
        .await
        .context("Failed to register bot commands")?;

    controller.start().await;

    tracing::info!("Bot initialized. Connecting to gateway and running event loops...");
    let running_shards = shard_manager.run(app_state);

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Ctrl+C received. Initiating graceful shutdown..."),
        Err(e) => tracing::error!(error = ?e, "Failed to listen for ctrl_c signal"),
    }

    controller.stop().await;
    tracing::info!("Waiting for gateway runners to complete...");
    running_shards.shutdown().await;

    tracing::info!("Shutdown complete.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::from_lookup(|key| match key {
            "UPLINK_API_URL" => Some("http://localhost:4000".to_string()),
            "LAVALINK_HOST" => Some("localhost".to_string()),
            "LAVALINK_PORT" => Some("2333".to_string()),
            "LAVALINK_PASSWORD" => Some("youshallnotpass".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn boot_config(prefix: Option<&str>) -> BootConfig {
        BootConfig {
            token: Some("token".to_string()),
            total_shards: 1,
            shard_ids: Vec::new(),
            prefix: prefix.map(str::to_string),
        }
    }

    #[test]
    fn test_boot_config_overrides_prefix() {
        let mut config = config();
        apply_boot_config(&mut config, &boot_config(Some("!")));
        assert_eq!(config.configured_prefix, "!");
    }

    #[test]
    fn test_blank_boot_prefix_keeps_local_one() {
        let mut config = config();
        apply_boot_config(&mut config, &boot_config(Some("  ")));
        assert_eq!(config.configured_prefix, ";");

        apply_boot_config(&mut config, &boot_config(None));
        assert_eq!(config.configured_prefix, ";");
    }

    #[tokio::test]
    async fn test_missing_uplink_url_aborts_boot() {
        let config = Config::from_lookup(|key| match key {
            "LAVALINK_HOST" => Some("localhost".to_string()),
            "LAVALINK_PORT" => Some("2333".to_string()),
            "LAVALINK_PASSWORD" => Some("pw".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(negotiate_boot(&config).await.is_none());
    }
}
