use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lnurl_service::{
    ClientConfig, LnurlClient,
    client::{
        ReqwestTransport,
        routes::{self, ClientState},
    },
    lightning::{ClnRpc, NodeRpc},
};

#[derive(Parser, Debug)]
#[command(name = "lnurl-client")]
#[command(about = "LNURL wallet driving a Core Lightning node")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    config: ClientConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the wallet HTTP API
    Serve {
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: String,
        #[arg(long, env = "PORT", default_value = "5001")]
        port: u16,
    },
    /// Pay an LNURL-pay endpoint
    Pay {
        /// Millisatoshis
        amount: u64,
        /// Defaults to the server's `/lnurl6`
        #[arg(long)]
        lnurl: Option<String>,
    },
    /// Request an inbound channel
    Channel {
        #[arg(long)]
        lnurl: Option<String>,
    },
    /// Withdraw from an LNURL-withdraw endpoint
    Withdraw {
        /// Millisatoshis
        amount: u64,
        #[arg(long)]
        lnurl: Option<String>,
    },
    Auth {
        #[arg(long)]
        lnurl: Option<String>,
    },
    /// Resolve a lightning address without paying
    Static { identifier: String },
    /// Pay a lightning address
    PayAddress {
        identifier: String,
        /// Millisatoshis
        amount: u64,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lnurl_service=info,lnurl_client=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Cli { config, command } = Cli::parse();

    let transport = Arc::new(ReqwestTransport::new(config.http_timeout())?);
    let node: Arc<dyn NodeRpc> = Arc::new(
        ClnRpc::new(config.lightning_rpc_path.clone(), config.rpc_timeout())
            .with_pay_timeout(config.pay_timeout()),
    );
    let endpoint = |lnurl: Option<String>, path: &str| lnurl.unwrap_or_else(|| config.endpoint(path));
    let client = LnurlClient::new(config.clone(), transport, node);

    match command {
        Command::Serve { host, port } => {
            let app = routes::router(ClientState {
                client: Arc::new(client),
            });
            let socket_addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&socket_addr).await?;
            tracing::info!("Client running on {}", socket_addr);
            tracing::info!("LNURL server: {}", config.server_url);
            axum::serve(listener, app).await?;
        }
        Command::Pay { amount, lnurl } => {
            let outcome = client.run_pay_flow(&endpoint(lnurl, "lnurl6"), amount).await?;
            print_json(&outcome)?;
        }
        Command::Channel { lnurl } => {
            let outcome = client.run_channel_flow(&endpoint(lnurl, "lnurl2")).await?;
            print_json(&outcome)?;
        }
        Command::Withdraw { amount, lnurl } => {
            let outcome = client
                .run_withdraw_flow(&endpoint(lnurl, "lnurl-withdraw"), amount)
                .await?;
            print_json(&outcome)?;
        }
        Command::Auth { lnurl } => {
            let response = client.run_auth_flow(&endpoint(lnurl, "lnurl-auth")).await?;
            print_json(&response)?;
        }
        Command::Static { identifier } => {
            let request = client.run_static_flow(&identifier).await?;
            print_json(&request)?;
        }
        Command::PayAddress { identifier, amount } => {
            let outcome = client.pay_address(&identifier, amount).await?;
            print_json(&outcome)?;
        }
    }

    Ok(())
}
