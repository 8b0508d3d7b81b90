use std::sync::Arc;

use super::controller::{HeartbeatController, HeartbeatTimings, UplinkIdentity};
use super::error::UplinkError;
use super::model::{BootConfig, HeartbeatOutcome};
use super::transport::HttpUplink;
use crate::config::UplinkConfig;

pub fn controller_from_config(config: &UplinkConfig) -> Result<HeartbeatController, UplinkError> {
    let api_url = config.api_url.as_deref().ok_or(UplinkError::ConfigMissing)?;
    let transport = HttpUplink::new(
        api_url,
        config.register_token.clone(),
        config.request_timeout,
    )?;

    Ok(HeartbeatController::new(
        Arc::new(transport),
        UplinkIdentity {
            port: config.server_port,
            server_id: config.server_id.clone(),
            communication_token: config.communication_token.clone(),
            server_location: config.server_location.clone(),
        },
        HeartbeatTimings {
            heartbeat_interval: config.heartbeat_interval,
            reconnect_interval: config.reconnect_interval,
        },
    ))
}

/// Fetches the boot configuration. No timer is armed, whatever the outcome.
#[tracing::instrument(skip(controller))]
pub async fn negotiate(controller: &HeartbeatController) -> Result<BootConfig, UplinkError> {
    if !controller.is_api_reachable().await {
        return Err(UplinkError::Unreachable);
    }

    match controller.init_heartbeat(true, true).await? {
        HeartbeatOutcome::BootConfig(boot_config) => {
            boot_config.bot_token()?;
            tracing::info!(
                total_shards = boot_config.total_shards,
                shards = ?boot_config.managed_shard_ids(),
                "Received boot configuration"
            );
            Ok(boot_config)
        }
        HeartbeatOutcome::Acknowledged => Err(UplinkError::MissingBootConfig),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uplink::controller::TimerKind;
    use crate::uplink::testing::MockUplink;
    use std::time::Duration;

    fn controller(transport: &Arc<MockUplink>) -> HeartbeatController {
        HeartbeatController::new(
            transport.clone(),
            UplinkIdentity {
                port: 0,
                server_id: "boot".to_string(),
                communication_token: String::new(),
                server_location: "local".to_string(),
            },
            HeartbeatTimings::default(),
        )
    }

    fn boot_config(token: Option<&str>) -> BootConfig {
        BootConfig {
            token: token.map(str::to_string),
            total_shards: 2,
            shard_ids: Vec::new(),
            prefix: None,
        }
    }

    #[test]
    fn test_missing_url_is_config_error() {
        let config = UplinkConfig {
            api_url: None,
            register_token: String::new(),
            communication_token: String::new(),
            server_id: "x".to_string(),
            server_port: 0,
            server_location: "x".to_string(),
            heartbeat_interval: Duration::from_secs(5),
            reconnect_interval: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
        };
        assert!(matches!(
            controller_from_config(&config),
            Err(UplinkError::ConfigMissing)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_negotiate_returns_boot_config_without_arming() {
        let transport = MockUplink::new();
        transport.set_boot_config(boot_config(Some("bot-token")));
        let controller = controller(&transport);

        let config = negotiate(&controller).await.unwrap();
        assert_eq!(config.bot_token().unwrap(), "bot-token");
        assert!(transport.last_request().unwrap().request_boot_conf);
        assert_eq!(controller.armed_timer().await, TimerKind::None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_token_is_fatal_and_arms_nothing() {
        let transport = MockUplink::new();
        transport.set_boot_config(boot_config(None));
        let controller = controller(&transport);

        let result = negotiate(&controller).await;
        assert!(matches!(result, Err(UplinkError::MissingToken)));
        assert_eq!(controller.armed_timer().await, TimerKind::None);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(transport.heartbeats(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_api_fails_before_exchange() {
        let transport = MockUplink::new();
        transport.set_probe_ok(false);
        let controller = controller(&transport);

        assert!(matches!(
            negotiate(&controller).await,
            Err(UplinkError::Unreachable)
        ));
        assert_eq!(transport.heartbeats(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_plain_acknowledgement_is_not_a_boot_config() {
        let transport = MockUplink::new();
        let controller = controller(&transport);

        assert!(matches!(
            negotiate(&controller).await,
            Err(UplinkError::MissingBootConfig)
        ));
    }
}
