use log::warn;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::OnceLock;
use std::time::Duration;

use crate::http::ProtocolVersion;
use crate::http::error::Result;
use crate::http::header::{HeaderSpec, HttpHeader};
use crate::http::parser::ParseMode;

static CONFIG: OnceLock<ServerConfig> = OnceLock::new();

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub buffer_size: usize,

    pub protocol_version: ProtocolVersion,
    pub parse_mode: ParseMode,
    pub max_header_size: usize,
    pub max_body_size: usize,

    #[serde(deserialize_with = "deserialize_duration")]
    pub read_timeout: Duration,

    pub server_name: String,

    /// Headers added to every response: name = "value", name = ["a", "b"]
    /// or name = { value = "...", replace = true }.
    pub default_headers: toml::Table,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8080,
            buffer_size: 4096,

            protocol_version: ProtocolVersion::default(),
            parse_mode: ParseMode::Lenient,
            max_header_size: 8192,
            max_body_size: 1024 * 1024, // 1 MB

            read_timeout: Duration::from_secs(5),

            server_name: "rustyhead/0.1".to_string(),

            default_headers: toml::Table::new(),
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: &str) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                warn!("Fail to read {path}: {err}, falling back to default config");
                return ServerConfig::default();
            }
        };

        Self::from_toml(&content).unwrap_or_else(|err| {
            warn!("Fail to deserialize config file {path}: {err}, falling back to default config");
            ServerConfig::default()
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str::<ServerConfig>(content)
    }

    /// Validated `default_headers`, in file order.
    pub fn default_headers(&self) -> Result<Vec<HttpHeader>> {
        self.default_headers
            .iter()
            .map(|(name, value)| HeaderSpec::try_from((name.as_str(), value))?.into_header())
            .collect()
    }
}

pub fn set_config(cfg: ServerConfig) {
    CONFIG.set(cfg).expect("Config already set");
}

pub fn config() -> &'static ServerConfig {
    CONFIG.get().expect("Config not initialized")
}

fn deserialize_duration<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Ok(Duration::from_secs_f64(secs))
}
