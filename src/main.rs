//! onekey CLI binary entry point.

use clap::Parser;
use onekey::cli::commands::{self, App};
use onekey::cli::{Cli, Commands};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> onekey::error::Result<()> {
    if let Commands::ConfigPath = cli.command {
        let path = cli
            .config
            .unwrap_or_else(onekey::config::default_config_path);
        println!("{}", path.display());
        return Ok(());
    }

    let mut app = App::load(cli.config)?;
    match cli.command {
        Commands::Translate => commands::handle_translate(&app).await,
        Commands::Listen => commands::handle_listen(&app).await,
        Commands::Generate(args) => commands::handle_generate(&app, args).await,
        Commands::Providers => {
            commands::handle_providers(&app);
            Ok(())
        }
        Commands::Use { provider } => commands::handle_use(&mut app, provider),
        Commands::SetKey { provider, key } => commands::handle_set_key(&mut app, provider, key),
        Commands::SetUrl { provider, url } => commands::handle_set_url(&mut app, provider, url),
        Commands::ConfigPath => Ok(()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("onekey=info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
