use super::Host;
use super::common::{CommonArgs, LogLevel, build_aggregator, init_logging};
use crate::Result;
use crate::server;
use clap::Parser;
use core::net::SocketAddr;
use ohno::IntoAppError;
use std::io::Write;
use tokio::net::TcpListener;

const LOG_TARGET: &str = "     serve";

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, value_name = "ADDR", default_value = "127.0.0.1:3000")]
    pub listen: SocketAddr,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Run the HTTP service until interrupted with Ctrl-C
pub async fn serve<H: Host>(host: &mut H, args: &ServeArgs) -> Result<()> {
    init_logging(args.common.log_level.unwrap_or(LogLevel::Info), true);

    let config = args.common.load_config()?;
    let aggregator = build_aggregator(&config, args.common.github_token.as_deref())?;
    let app = server::router(aggregator, &config.cache_control)?;

    let listener = TcpListener::bind(args.listen)
        .await
        .into_app_err_with(|| format!("binding to {}", args.listen))?;

    let addr = listener.local_addr().into_app_err("determining the listening address")?;
    let _ = writeln!(host.output(), "Serving npm package health checks on http://{addr}{}", server::NPM_ROUTE);

    server::serve(listener, app, async {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!(target: LOG_TARGET, "Received Ctrl-C, shutting down");
        }
    })
    .await
}
