//! Configuration file handling

use serde::Deserialize;
use std::time::Duration;

use super::paths::config_path;
use super::Result;
use crate::ipc::client::ClientConfig;
use crate::ipc::codec::Codec;
use crate::ipc::frame::DEFAULT_MAX_FRAME_LEN;
use crate::ipc::server::ServerConfig;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Client settings used by `send`
    #[serde(default)]
    pub client: ClientSection,

    /// Daemon settings used by `serve`
    #[serde(default)]
    pub server: ServerSection,
}

/// Client settings
#[derive(Debug, Deserialize)]
pub struct ClientSection {
    /// Payload encoding, must match the daemon's
    #[serde(default)]
    pub codec: Codec,

    /// Maximum wait for a response; 0 waits forever
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Largest frame accepted in either direction
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: u32,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            codec: Codec::default(),
            request_timeout_secs: default_request_timeout(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

/// Daemon settings
#[derive(Debug, Deserialize)]
pub struct ServerSection {
    #[serde(default)]
    pub codec: Codec,

    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: u32,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            codec: Codec::default(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_frame_bytes() -> u32 {
    DEFAULT_MAX_FRAME_LEN
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    super::Error::FileRead {
                        path: path.display().to_string(),
                        error: e.to_string(),
                    }
                })?;
                return Self::parse(&content);
            }
        }
        Ok(Self::default())
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.client.max_frame_bytes == 0 || self.server.max_frame_bytes == 0 {
            return Err(super::Error::Config(
                "max_frame_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the client settings
    pub fn client_config(&self) -> ClientConfig {
        let request_timeout = match self.client.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        ClientConfig {
            codec: self.client.codec,
            request_timeout,
            max_frame_len: self.client.max_frame_bytes,
            suffix: None,
        }
    }

    /// Build the daemon settings
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            codec: self.server.codec,
            max_frame_len: self.server.max_frame_bytes,
            suffix: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.client.codec, Codec::Json);
        assert_eq!(config.client.request_timeout_secs, 30);
        assert_eq!(config.server.max_frame_bytes, DEFAULT_MAX_FRAME_LEN);
    }

    #[test]
    fn test_zero_timeout_disables_timeout() {
        let config = Config::parse("[client]\nrequest_timeout_secs = 0\n").unwrap();
        assert_eq!(config.client_config().request_timeout, None);
    }

    #[test]
    fn test_client_section_overrides() {
        let config = Config::parse(
            "[client]\ncodec = \"toml\"\nrequest_timeout_secs = 5\nmax_frame_bytes = 1024\n",
        )
        .unwrap();
        let client = config.client_config();
        assert_eq!(client.codec, Codec::Toml);
        assert_eq!(client.request_timeout, Some(Duration::from_secs(5)));
        assert_eq!(client.max_frame_len, 1024);
    }

    #[test]
    fn test_unknown_codec_is_rejected() {
        let err = Config::parse("[server]\ncodec = \"bincode\"\n").unwrap_err();
        assert!(matches!(err, super::super::Error::ConfigParse(_)));
    }

    #[test]
    fn test_zero_frame_limit_is_rejected() {
        let err = Config::parse("[server]\nmax_frame_bytes = 0\n").unwrap_err();
        assert!(matches!(err, super::super::Error::Config(_)));
    }
}
