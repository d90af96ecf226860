//! CLI entry point - the composition root.
//!
//! Command dispatch routes to handlers, which only see the `CliContext`.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use devpreview_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = CliConfig::with_defaults(cli.data_dir).map_err(|e| CliError::Config(e.to_string()))?;
    let ctx = bootstrap(config)
        .await
        .map_err(|e| CliError::Database(format!("{e:#}")))?;

    match command {
        Commands::Watch(args) => handlers::watch::execute(&ctx, args).await,
        Commands::Detect(args) => handlers::detect::execute(&ctx, args).await,
        Commands::Override { command } => handlers::overrides::execute(&ctx, command).await,
        Commands::Config { command } => handlers::config::execute(&ctx, command).await,
        Commands::Prefs { command } => handlers::prefs::execute(&ctx, command).await,
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables before clap reads `env` defaults
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(CliError::exit_code_for(&e));
    }
}
