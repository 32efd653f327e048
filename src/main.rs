use clap::Parser;
use tracing_subscriber::EnvFilter;
use weekplan::cli::commands::{Cli, Commands};
use weekplan::cli::handlers;

fn init_logging() {
    let filter = EnvFilter::try_from_env("WP_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init(args) => {
            // Init is handled before planner discovery
            handlers::cmd_init(args, cli.planner_dir.as_deref())
        }
        _ => handlers::dispatch(cli),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
