use serde::{Deserialize, Serialize};

use super::error::UplinkError;

/// Message the control plane uses to flag a response carrying the boot configuration.
pub const BOOTCONF_MESSAGE: &str = "bootconf";
/// Message the control plane uses when this server is unknown to it.
pub const NOT_REGISTERED_MESSAGE: &str = "not_registered";

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatRequest {
    pub port: u16,
    pub server_id: String,
    #[serde(rename = "communication_token")]
    pub communication_token: String,
    pub managed_shards: Option<Vec<ManagedShard>>,
    /// Unix timestamp in milliseconds.
    pub startup_time: i64,
    /// Unix timestamp in milliseconds.
    pub current_time: i64,
    pub server_location: String,
    pub request_boot_conf: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ManagedShard {
    pub id: u32,
    pub guilds: usize,
    pub latency_ms: Option<u128>,
    pub status: ShardStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShardStatus {
    Connecting,
    Ready,
    Disconnected,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

#[derive(Deserialize, Debug, Clone)]
pub struct HeartbeatResponse {
    pub status: ResponseStatus,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: Option<BootConfig>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ProbeResponse {
    pub status: ResponseStatus,
    #[serde(default)]
    pub message: String,
}

/// Startup parameters handed out by the control plane.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BootConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_total_shards")]
    pub total_shards: u32,
    /// Shards this process runs. Empty means every shard in `0..total_shards`.
    #[serde(default)]
    pub shard_ids: Vec<u32>,
    #[serde(default)]
    pub prefix: Option<String>,
}

fn default_total_shards() -> u32 {
    1
}

impl BootConfig {
    pub fn managed_shard_ids(&self) -> Vec<u32> {
        if self.shard_ids.is_empty() {
            (0..self.total_shards).collect()
        } else {
            self.shard_ids
                .iter()
                .copied()
                .filter(|id| *id < self.total_shards)
                .collect()
        }
    }

    pub fn bot_token(&self) -> Result<&str, UplinkError> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(UplinkError::MissingToken)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeartbeatOutcome {
    Acknowledged,
    BootConfig(BootConfig),
}

impl HeartbeatResponse {
    pub fn into_outcome(self) -> Result<HeartbeatOutcome, UplinkError> {
        match self.status {
            ResponseStatus::Success => match self.result {
                Some(boot_config) if self.message == BOOTCONF_MESSAGE => {
                    Ok(HeartbeatOutcome::BootConfig(boot_config))
                }
                _ => Ok(HeartbeatOutcome::Acknowledged),
            },
            ResponseStatus::Error if self.message == NOT_REGISTERED_MESSAGE => {
                Err(UplinkError::Registration(self.message))
            }
            ResponseStatus::Error => Err(UplinkError::Logical(self.message)),
        }
    }
}

impl ProbeResponse {
    pub fn into_result(self) -> Result<(), UplinkError> {
        match self.status {
            ResponseStatus::Success => Ok(()),
            ResponseStatus::Error if self.message == NOT_REGISTERED_MESSAGE => {
                Err(UplinkError::Registration(self.message))
            }
            ResponseStatus::Error => Err(UplinkError::Logical(self.message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> HeartbeatResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_plain_success_is_acknowledged() {
        let outcome = parse(r#"{"status":"success","message":"ok"}"#)
            .into_outcome()
            .unwrap();
        assert_eq!(outcome, HeartbeatOutcome::Acknowledged);
    }

    #[test]
    fn test_bootconf_message_returns_config() {
        let outcome = parse(
            r#"{"status":"success","message":"bootconf","result":{"token":"abc","totalShards":4,"shardIds":[2,3]}}"#,
        )
        .into_outcome()
        .unwrap();

        let HeartbeatOutcome::BootConfig(config) = outcome else {
            panic!("expected a boot configuration");
        };
        assert_eq!(config.bot_token().unwrap(), "abc");
        assert_eq!(config.managed_shard_ids(), vec![2, 3]);
    }

    #[test]
    fn test_result_without_bootconf_message_is_ignored() {
        let outcome = parse(r#"{"status":"success","message":"ok","result":{"token":"abc"}}"#)
            .into_outcome()
            .unwrap();
        assert_eq!(outcome, HeartbeatOutcome::Acknowledged);
    }

    #[test]
    fn test_error_status_is_logical_failure() {
        let err = parse(r#"{"status":"error","message":"server overloaded"}"#)
            .into_outcome()
            .unwrap_err();
        assert!(matches!(err, UplinkError::Logical(msg) if msg == "server overloaded"));
    }

    #[test]
    fn test_not_registered_is_registration_error() {
        let err = parse(r#"{"status":"error","message":"not_registered"}"#)
            .into_outcome()
            .unwrap_err();
        assert!(matches!(err, UplinkError::Registration(_)));
    }

    #[test]
    fn test_missing_or_blank_token() {
        let config: BootConfig = serde_json::from_str(r#"{"totalShards":2}"#).unwrap();
        assert!(matches!(config.bot_token(), Err(UplinkError::MissingToken)));

        let config: BootConfig = serde_json::from_str(r#"{"token":"  "}"#).unwrap();
        assert!(matches!(config.bot_token(), Err(UplinkError::MissingToken)));
    }

    #[test]
    fn test_managed_shards_default_to_all() {
        let config: BootConfig = serde_json::from_str(r#"{"token":"t","totalShards":3}"#).unwrap();
        assert_eq!(config.managed_shard_ids(), vec![0, 1, 2]);

        let config: BootConfig =
            serde_json::from_str(r#"{"token":"t","totalShards":2,"shardIds":[1,5]}"#).unwrap();
        assert_eq!(config.managed_shard_ids(), vec![1]);
    }

    #[test]
    fn test_request_uses_wire_field_names() {
        let request = HeartbeatRequest {
            port: 8080,
            server_id: "eu-1".to_string(),
            communication_token: "secret".to_string(),
            managed_shards: None,
            startup_time: 1,
            current_time: 2,
            server_location: "fra".to_string(),
            request_boot_conf: true,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["serverId"], "eu-1");
        assert_eq!(value["communication_token"], "secret");
        assert!(value["managedShards"].is_null());
        assert_eq!(value["requestBootConf"], true);
        assert_eq!(value["serverLocation"], "fra");
    }

    #[test]
    fn test_probe_statuses() {
        let ok: ProbeResponse = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert!(ok.into_result().is_ok());

        let err: ProbeResponse =
            serde_json::from_str(r#"{"status":"error","message":"not_registered"}"#).unwrap();
        assert!(matches!(err.into_result(), Err(UplinkError::Registration(_))));
    }
}
