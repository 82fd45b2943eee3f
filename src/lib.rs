pub mod app_state;
pub mod client;
pub mod config;
pub mod db;
pub mod documents;
pub mod error;
pub mod handlers;
pub mod lightning;
pub mod observer;
pub mod protocol;

pub use app_state::AppState;
pub use client::LnurlClient;
pub use config::{ClientConfig, ServerConfig};
pub use error::{LnurlError, LnurlResult};
