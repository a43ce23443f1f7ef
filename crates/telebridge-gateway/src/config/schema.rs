use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use telebridge_core::error::{Result, TelemetryError};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub telemetry: TelemetrySection,

    #[serde(default)]
    pub echo: EchoSection,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            telemetry: TelemetrySection::default(),
            echo: EchoSection::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(TelemetryError::InvalidConfig(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.telemetry.validate()?;
        self.echo.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Upper bound for a single inbound WebSocket message.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(1..=64 * 1024 * 1024).contains(&self.max_message_bytes) {
            return Err(TelemetryError::InvalidConfig(
                "server.max_message_bytes must be between 1 and 67108864".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            TelemetryError::InvalidConfig(format!("server.listen must be a valid SocketAddr: {e}"))
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySection {
    /// Pause before each `GetTelemetry` command.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How long the client has to answer a command.
    #[serde(default = "default_reply_timeout_ms")]
    pub reply_timeout_ms: u64,
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            reply_timeout_ms: default_reply_timeout_ms(),
        }
    }
}

impl TelemetrySection {
    pub fn validate(&self) -> Result<()> {
        if !(10..=600_000).contains(&self.poll_interval_ms) {
            return Err(TelemetryError::InvalidConfig(
                "telemetry.poll_interval_ms must be between 10 and 600000".into(),
            ));
        }
        if !(10..=600_000).contains(&self.reply_timeout_ms) {
            return Err(TelemetryError::InvalidConfig(
                "telemetry.reply_timeout_ms must be between 10 and 600000".into(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EchoSection {
    /// Keepalive ping interval on `/echo`.
    #[serde(default = "default_heartbeat_ms")]
    pub heartbeat_ms: u64,
}

impl Default for EchoSection {
    fn default() -> Self {
        Self {
            heartbeat_ms: default_heartbeat_ms(),
        }
    }
}

impl EchoSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=600_000).contains(&self.heartbeat_ms) {
            return Err(TelemetryError::InvalidConfig(
                "echo.heartbeat_ms must be between 100 and 600000".into(),
            ));
        }
        Ok(())
    }

    pub fn heartbeat(&self) -> Duration {
        Duration::from_millis(self.heartbeat_ms)
    }
}

fn default_listen() -> String {
    "0.0.0.0:8091".into()
}
fn default_max_message_bytes() -> usize {
    4 * 1024 * 1024
}
fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_reply_timeout_ms() -> u64 {
    1000
}
fn default_heartbeat_ms() -> u64 {
    3000
}
