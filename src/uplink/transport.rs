use std::time::Duration;

use async_trait::async_trait;

use super::error::UplinkError;
use super::model::{HeartbeatRequest, HeartbeatResponse, ProbeResponse};

/// The two requests the heartbeat controller makes against the control plane.
#[async_trait]
pub trait UplinkTransport: Send + Sync {
    async fn send_heartbeat(
        &self,
        request: &HeartbeatRequest,
    ) -> Result<HeartbeatResponse, UplinkError>;

    async fn probe(&self) -> Result<ProbeResponse, UplinkError>;
}

pub struct HttpUplink {
    client: reqwest::Client,
    base_url: String,
    register_token: String,
}

impl HttpUplink {
    pub fn new(
        base_url: &str,
        register_token: String,
        timeout: Duration,
    ) -> Result<Self, UplinkError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
            register_token,
        })
    }

    fn heartbeat_url(&self) -> String {
        format!("{}srvHeartbeat", self.base_url)
    }
}

/// Endpoints are appended directly to the configured url, so it has to end with a slash.
fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

#[async_trait]
impl UplinkTransport for HttpUplink {
    async fn send_heartbeat(
        &self,
        request: &HeartbeatRequest,
    ) -> Result<HeartbeatResponse, UplinkError> {
        let response = self
            .client
            .post(self.heartbeat_url())
            .query(&[("registerToken", self.register_token.as_str())])
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%status, "Heartbeat answered with a non-success status");
            return Err(UplinkError::Status(status));
        }

        Ok(response.json::<HeartbeatResponse>().await?)
    }

    async fn probe(&self) -> Result<ProbeResponse, UplinkError> {
        let response = self.client.get(&self.base_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UplinkError::Status(status));
        }

        Ok(response.json::<ProbeResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://uplink.example/api"),
            "https://uplink.example/api/"
        );
        assert_eq!(
            normalize_base_url(" https://uplink.example/api/ "),
            "https://uplink.example/api/"
        );
    }

    #[test]
    fn test_heartbeat_url() {
        let uplink = HttpUplink::new(
            "https://uplink.example/v1",
            "register".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(uplink.heartbeat_url(), "https://uplink.example/v1/srvHeartbeat");
    }
}
