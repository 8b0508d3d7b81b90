use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UplinkError {
    /// `UPLINK_API_URL` is not set, so there is nothing to negotiate with.
    #[error("uplink API url is not configured")]
    ConfigMissing,

    #[error("uplink API is not reachable")]
    Unreachable,

    #[error("uplink request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("uplink answered with HTTP {0}")]
    Status(StatusCode),

    /// The control plane answered, but with a non-`success` status.
    #[error("uplink rejected the heartbeat: {0}")]
    Logical(String),

    /// This server is not registered with the control plane (or its register token is wrong).
    #[error("uplink registration error: {0}")]
    Registration(String),

    #[error("uplink did not return a boot configuration")]
    MissingBootConfig,

    #[error("boot configuration does not contain a bot token")]
    MissingToken,
}

