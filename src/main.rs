mod cli;

use log::{info, warn};
use subreddit_stats::config::Config;
use subreddit_stats::fetcher::PostFetcher;
use subreddit_stats::scheduler::{Schedule, Scheduler};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::build_cli();
    let matches = cmd.get_matches();
    let log_level = matches.get_one::<String>("log-level").cloned();
    let version_flag = matches.get_flag("version");

    cli::init_logging(log_level.as_deref());

    if version_flag {
        println!("subreddit-stats {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut cfg = Config::from_env().map_err(anyhow::Error::msg)?;
    if let Some(sub) = matches.get_one::<String>("subreddit") {
        cfg.subreddit = sub.clone();
    }

    let fetcher = PostFetcher::from_config(&cfg)?;
    let scheduler = Scheduler::new(fetcher, Schedule::from_config(&cfg));
    let cancel = CancellationToken::new();

    if matches.get_flag("once") {
        scheduler.run_logged_cycle(1, &cancel).await?;
        return Ok(());
    }

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown requested");
                shutdown.cancel();
            }
            Err(e) => warn!("cannot listen for shutdown signal: {}", e),
        }
    });

    scheduler.run(&cancel).await;
    Ok(())
}
