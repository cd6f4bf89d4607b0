use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use toolbox::commands::{self, ConsoleReporter};
use toolbox::{HttpFetcher, PackageManager, Paths, Platform, colors};

#[derive(Parser)]
#[command(name = "toolbox")]
#[command(author, version, about = "Install and manage packages from the toolbox catalog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Data directory holding the catalog, records and installed packages
    #[arg(long, global = true, env = "TOOLBOX_HOME")]
    home: Option<PathBuf>,

    /// Catalog source used when the cached catalog names none
    #[arg(long, global = true, env = "TOOLBOX_CATALOG_URL")]
    catalog_url: Option<String>,

    /// Install for this platform instead of the host (Windows, Darwin, Linux)
    #[arg(long, global = true)]
    platform: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all available packages
    List,

    /// List installed packages
    Installed,

    /// Install a package, or every package with '*'
    Install {
        /// Package name or '*'
        package: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Uninstall a package
    Uninstall {
        /// Package name
        package: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Update the package list
    Update,

    /// Start the interactive shell (default)
    Shell,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    colors::init_colors();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            colors::error(&e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli) -> toolbox::Result<()> {
    let platform = cli
        .platform
        .map(Platform::new)
        .unwrap_or_else(Platform::current);
    let paths = match cli.home {
        Some(home) => Paths::new(home),
        None => Paths::detect(&platform),
    };
    tracing::debug!("data directory: {}", paths.root().display());

    let mut pm = PackageManager::new(paths, platform, HttpFetcher::new()?)
        .with_reporter(ConsoleReporter::new());
    if let Some(url) = cli.catalog_url {
        pm = pm.with_catalog_url(url);
    }

    match cli.command {
        Some(Commands::List) => commands::list(&pm).await,
        Some(Commands::Installed) => commands::installed(&pm),
        Some(Commands::Install { package, yes }) => commands::install(&pm, &package, yes).await,
        Some(Commands::Uninstall { package, yes }) => {
            commands::uninstall(&pm, &package, yes).await
        }
        Some(Commands::Update) => commands::update(&pm).await,
        Some(Commands::Shell) | None => {
            if cli.verbose {
                println!("{}", format!("Platform: {}", pm.platform()).dimmed());
            }
            commands::run_shell(&pm).await
        }
    }
}
