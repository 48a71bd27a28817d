use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crankshaft::unmin::JsBeautify;
use crankshaft::{cdp, config, patcher, plugins};

/// Patches Steam client scripts so Crankshaft plugins can hook in, then
/// reloads the running client. Steam overwrites modified resources at
/// startup, so this runs on every client start.
#[derive(Parser, Debug)]
#[command(name = "crankshaft", version)]
struct Args {
    /// Steam ui directory containing the client scripts
    #[arg(long, env = "CRANKSHAFT_STEAMUI", default_value_os_t = config::default_steamui_path())]
    steamui: PathBuf,

    /// CEF remote debugging port of the running Steam client
    #[arg(long, default_value_t = 8080)]
    debug_port: u16,

    /// Port of the local Crankshaft server the injected bootstrap calls back to
    #[arg(long, default_value_t = 8085)]
    server_port: u16,

    /// Directory to scan for installed plugins
    #[arg(long, default_value_os_t = config::default_plugins_dir())]
    plugins_dir: PathBuf,

    /// Apply the patch but skip reloading the client
    #[arg(long)]
    no_reload: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    patcher::patch_client_scripts(&args.steamui, args.server_port, &JsBeautify::default())?;

    let plugins = plugins::list_plugins(&args.plugins_dir);
    if plugins.is_empty() {
        warn!("No plugins found in {}", args.plugins_dir.display());
    }
    for plugin in &plugins {
        info!("Found plugin {} {}", plugin.name, plugin.version);
    }

    if args.no_reload {
        info!("Skipping client reload (--no-reload)");
        return Ok(());
    }

    cdp::reload_client(args.debug_port).await?;
    info!("Done");

    Ok(())
}
