use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::protocol::Metadata;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name}: minimum must be above 0 msat")]
    ZeroMinimum { name: &'static str },
    #[error("{name}: minimum {min} msat is above maximum {max} msat")]
    InvertedBounds {
        name: &'static str,
        min: u64,
        max: u64,
    },
}

fn check_bounds(name: &'static str, min: u64, max: u64) -> Result<(), ConfigError> {
    if min == 0 {
        return Err(ConfigError::ZeroMinimum { name });
    }
    if min > max {
        return Err(ConfigError::InvertedBounds { name, min, max });
    }
    Ok(())
}

#[derive(Parser, Debug, Clone)]
#[command(name = "lnurl-server")]
#[command(about = "LNURL pay/channel/withdraw server backed by a Core Lightning node")]
#[command(version)]
pub struct ServerConfig {
    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// Public base URL callbacks are advertised under
    #[arg(long, env = "PUBLIC_URL", default_value = "http://localhost:5000")]
    pub public_url: String,

    /// SQLite database URL for gift-card orders
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://gift_cards.db")]
    pub database_url: String,

    /// Path to the lightningd JSON-RPC socket
    #[arg(long, env = "LIGHTNING_RPC_PATH")]
    pub lightning_rpc_path: PathBuf,

    /// Expected node id; invoices are refused when connected to another node
    #[arg(long, env = "MERCHANT_NODE_ID")]
    pub merchant_node_id: Option<String>,

    /// text/plain metadata advertised in the pay request
    #[arg(long, env = "METADATA_TEXT", default_value = "Payment for services")]
    pub metadata_text: String,

    /// Minimum sendable amount in millisatoshis
    #[arg(long, env = "MIN_SENDABLE", default_value = "1000")]
    pub min_sendable: u64,

    /// Maximum sendable amount in millisatoshis
    #[arg(long, env = "MAX_SENDABLE", default_value = "1000000")]
    pub max_sendable: u64,

    /// Minimum withdrawable amount in millisatoshis
    #[arg(long, env = "MIN_WITHDRAWABLE", default_value = "1000")]
    pub min_withdrawable: u64,

    /// Maximum withdrawable amount in millisatoshis
    #[arg(long, env = "MAX_WITHDRAWABLE", default_value = "100000")]
    pub max_withdrawable: u64,

    /// Directory of static pay documents, one file per username
    #[arg(long, env = "WELL_KNOWN_DIR")]
    pub well_known_dir: Option<PathBuf>,

    /// Node RPC timeout in seconds
    #[arg(long, env = "RPC_TIMEOUT_SECS", default_value = "60")]
    pub rpc_timeout_secs: u64,

    /// Timeout for `pay` in seconds; payments can take a while to resolve
    #[arg(long, env = "PAY_TIMEOUT_SECS", default_value = "300")]
    pub pay_timeout_secs: u64,

    /// Lifetime of an issued k1 in seconds
    #[arg(long, env = "K1_TTL_SECS", default_value = "600")]
    pub k1_ttl_secs: u64,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn callback_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_url.trim_end_matches('/'), path)
    }

    pub fn metadata(&self) -> Metadata {
        Metadata::plain_text(&self.metadata_text)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    pub fn pay_timeout(&self) -> Duration {
        Duration::from_secs(self.pay_timeout_secs)
    }

    pub fn k1_ttl(&self) -> Duration {
        Duration::from_secs(self.k1_ttl_secs)
    }

    /// Reject amount bounds no wallet could satisfy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_bounds("sendable", self.min_sendable, self.max_sendable)?;
        check_bounds("withdrawable", self.min_withdrawable, self.max_withdrawable)
    }
}

#[derive(Parser, Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the LNURL server
    #[arg(long, env = "LNURL_SERVER", default_value = "http://localhost:5000")]
    pub server_url: String,

    /// Path to the payer's lightningd JSON-RPC socket
    #[arg(long, env = "LIGHTNING_RPC_PATH")]
    pub lightning_rpc_path: PathBuf,

    /// Expected node id of the payer's node
    #[arg(long, env = "CLIENT_NODE_ID")]
    pub client_node_id: Option<String>,

    /// Smallest amount this wallet sends, in millisatoshis
    #[arg(long, env = "LOCAL_MIN_SENDABLE", default_value = "1000")]
    pub local_min_sendable: u64,

    /// Largest amount this wallet sends, in millisatoshis
    #[arg(long, env = "LOCAL_MAX_SENDABLE", default_value = "50000000")]
    pub local_max_sendable: u64,

    /// Channel size requested through LNURL-channel, in satoshis
    #[arg(long, env = "CHANNEL_AMOUNT_SAT", default_value = "1000000")]
    pub channel_amount_sat: u64,

    /// Ask for an unannounced channel
    #[arg(long, env = "PRIVATE_CHANNEL", default_value_t = true, action = clap::ArgAction::Set)]
    pub private_channel: bool,

    /// Scheme used to resolve lightning addresses
    #[arg(long, env = "WELL_KNOWN_SCHEME", default_value = "https")]
    pub well_known_scheme: String,

    /// HTTP timeout in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value = "30")]
    pub http_timeout_secs: u64,

    /// Node RPC timeout in seconds
    #[arg(long, env = "RPC_TIMEOUT_SECS", default_value = "60")]
    pub rpc_timeout_secs: u64,

    /// Timeout for `pay` in seconds; payments can take a while to resolve
    #[arg(long, env = "PAY_TIMEOUT_SECS", default_value = "300")]
    pub pay_timeout_secs: u64,
}

impl ClientConfig {
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.server_url.trim_end_matches('/'), path)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    pub fn pay_timeout(&self) -> Duration {
        Duration::from_secs(self.pay_timeout_secs)
    }
}
