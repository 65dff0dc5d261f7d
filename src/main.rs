use clap::Parser;
use issuemock::{IssueMockServerBuilder, DEFAULT_PORT};
use std::error::Error;
use tracing_subscriber::EnvFilter;

/// Holds command line parameters provided by the user.
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Canned-response mock server for the issue assignee endpoints",
    long_about = None
)]
struct ExecutionParameters {
    /// Port to listen on.
    #[arg(short, long, env = "ISSUEMOCK_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Bind to 0.0.0.0 instead of 127.0.0.1.
    #[arg(short, long, env = "ISSUEMOCK_EXPOSE")]
    pub expose: bool,
    /// Print one log line per request.
    #[arg(long, env = "ISSUEMOCK_PRINT_ACCESS_LOG")]
    pub print_access_log: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("issuemock=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let params = ExecutionParameters::parse();

    tracing::info!(
        "Starting {} server V{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let server = IssueMockServerBuilder::new()
        .port(params.port)
        .expose(params.expose)
        .print_access_log(params.print_access_log)
        .build()?;

    server
        .start_with_signals(None, async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("cannot listen for shutdown signal: {}", err);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    Ok(())
}
