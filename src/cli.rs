use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("subreddit-stats")
        .about("Periodically report top posts and top contributors of a subreddit")
        .arg(
            Arg::new("subreddit")
                .long("subreddit")
                .num_args(1)
                .help("Subreddit to watch (overrides SUBREDDIT_STATS_SUBREDDIT)"),
        )
        .arg(
            Arg::new("once")
                .long("once")
                .help("Run a single cycle and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .num_args(1)
                .help("Override RUST_LOG level (e.g., info, debug)"),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .help("Print version and exit")
                .action(ArgAction::SetTrue),
        )
}

pub fn init_logging(level: Option<&str>) {
    // Explicit level wins, then RUST_LOG, then info.
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(lvl) = level {
        builder.parse_filters(lvl);
    }
    builder.init();
}
