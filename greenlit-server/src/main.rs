use std::path::PathBuf;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use greenlit_core::Error;
use greenlit_core::tasks::allow_list_rebuild::rebuild_allow_lists;
use greenlit_core::web;

mod context;
use context::ServerContext;

#[derive(Parser, Debug, Clone)]
#[command(name = "greenlit")]
#[command(author, version, about = "GreenLit - license redemption and whitelist bot")]
pub struct Args {
    /// Directory holding the database, allow-lists, ledger and settings
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// SQLite database path (defaults to <data-dir>/greenlit.db)
    #[arg(long)]
    pub db_path: Option<String>,

    /// Address for the webhook / allow-list HTTP server (defaults to 0.0.0.0:$PORT or 3000)
    #[arg(long)]
    pub http_addr: Option<String>,

    /// JSON file replacing the built-in system definitions
    #[arg(long)]
    pub systems_file: Option<PathBuf>,

    /// Rewrite every allow-list from the database before serving
    #[arg(long, default_value = "false")]
    pub rebuild_allow_lists: bool,

    /// Run only the HTTP server, without connecting to Discord
    #[arg(long, default_value = "false")]
    pub headless: bool,
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("greenlit=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let args = Args::parse();
    info!(
        "GreenLit starting. data_dir={}, headless={}, rebuild_allow_lists={}",
        args.data_dir.display(),
        args.headless,
        args.rebuild_allow_lists
    );

    if let Err(e) = run(args).await {
        error!("Server error: {:?}", e);
        return Err(e.into());
    }
    info!("Main finished. Goodbye!");
    Ok(())
}

async fn run(args: Args) -> Result<(), Error> {
    let ctx = ServerContext::new(&args).await?;

    if args.rebuild_allow_lists {
        let total = rebuild_allow_lists(&ctx.catalog, ctx.redemptions.as_ref(), &ctx.stores.allow_lists).await?;
        info!("Allow-lists rebuilt ({} entries).", total);
    }

    // Ctrl-C flips the shutdown flag for every long-running piece.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Error waiting for Ctrl-C: {:?}", e);
        }
        info!("Ctrl-C received; shutting down.");
        let _ = shutdown_tx.send(true);
    });

    let http_task = tokio::spawn(web::serve(
        ctx.config.http_addr,
        ctx.web_state.clone(),
        shutdown_rx.clone(),
    ));

    match (&ctx.discord, &ctx.service) {
        (Some(bot), Some(service)) => {
            bot.register_commands(service).await?;
            bot.run(service.clone(), shutdown_rx).await?;
        }
        _ => {
            info!("Headless mode: Discord gateway disabled.");
            let mut rx = shutdown_rx;
            while rx.changed().await.is_ok() {
                if *rx.borrow() {
                    break;
                }
            }
        }
    }

    match http_task.await {
        Ok(result) => result?,
        Err(e) => error!("HTTP task panicked: {:?}", e),
    }
    info!("Server shutdown complete.");
    Ok(())
}
