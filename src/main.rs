use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use otpsync::{Result, SyncConfig};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "otpsync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cached OTP data sync and legacy cache migration", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to config.toml (default: <config_dir>/otpsync/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the startup sequence and show OTP services
    Sync {
        /// Output the view as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show which cache keys are present
    Status,

    /// Remove every cached key
    Logout,

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{}", format!("Error: failed to create tokio runtime: {}", e).red());
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run_async(cli)) {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

async fn run_async(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        generate(shell, &mut Cli::command(), "otpsync", &mut io::stdout());
        return Ok(());
    }

    let config = SyncConfig::load(cli.config.as_deref())?;
    otpsync::logging::init(&config.log_level);

    match cli.command {
        Commands::Sync { json } => otpsync::cli::sync::run(&config, json).await?,
        Commands::Status => otpsync::cli::status::run(&config).await?,
        Commands::Logout => otpsync::cli::logout::run(&config).await?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
