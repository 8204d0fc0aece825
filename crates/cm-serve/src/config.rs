use cm_core::nonce::DEFAULT_NONCE_TTL;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const PORT_VAR: &str = "PORT";
pub const HOST_VAR: &str = "CAPMOCK_HOST";
pub const DB_PATH_VAR: &str = "CAPMOCK_DB_PATH";
pub const RESPONSE_DELAY_VAR: &str = "CAPMOCK_RESPONSE_DELAY_MS";
pub const NONCE_TTL_VAR: &str = "CAPMOCK_NONCE_TTL_MS";

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_DB_PATH: &str = "db.json";
pub const DEFAULT_RESPONSE_DELAY: Duration = Duration::from_millis(5_000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    pub host: IpAddr,
    pub port: u16,
    pub db_path: PathBuf,
    /// Hold-back applied to simulated `/mapp/events` replies.
    pub response_delay: Duration,
    pub nonce_ttl: Duration,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            response_delay: DEFAULT_RESPONSE_DELAY,
            nonce_ttl: DEFAULT_NONCE_TTL,
        }
    }
}

impl ServeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `lookup`; blank or unparseable values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            host: parse_or(&lookup, HOST_VAR, defaults.host),
            port: parse_or(&lookup, PORT_VAR, defaults.port),
            db_path: non_blank(&lookup, DB_PATH_VAR).map_or(defaults.db_path, PathBuf::from),
            response_delay: Duration::from_millis(parse_or(
                &lookup,
                RESPONSE_DELAY_VAR,
                millis(defaults.response_delay),
            )),
            nonce_ttl: Duration::from_millis(parse_or(
                &lookup,
                NONCE_TTL_VAR,
                millis(defaults.nonce_ttl),
            )),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn non_blank<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = non_blank(lookup, key) else {
        return default;
    };
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(key, value = %raw, "ignoring unparseable setting");
        default
    })
}
