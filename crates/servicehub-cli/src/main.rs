//! ServiceHub CLI - sign in to the ServiceHub customer or admin backend.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use servicehub_session::AppFlavor;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::Session;
use config::CliConfig;

/// ServiceHub - local services ordering
#[derive(Parser, Debug)]
#[command(name = "servicehub")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// App to act as (customer or admin)
    #[arg(long, global = true)]
    app: Option<AppFlavor>,

    /// Backend base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Session file to use instead of the default location
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and remember the session
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,
        /// Account password
        #[arg(short, long)]
        password: String,
    },

    /// Create an account
    Register {
        /// Account email
        #[arg(short, long)]
        email: String,
        /// Account password
        #[arg(short, long)]
        password: String,
        /// Password confirmation
        #[arg(short, long)]
        confirm: Option<String>,
        /// Sign in right after registering
        #[arg(long)]
        sign_in: bool,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in identity and active screens
    Status,

    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show effective configuration
    Show,

    /// Persist the backend URL
    SetUrl {
        /// Backend base URL
        url: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("servicehub={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<String> {
    let config_path = cli.config.clone().or_else(CliConfig::default_path);
    let mut config = config_path
        .as_deref()
        .map(CliConfig::load_from)
        .unwrap_or_default();

    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(path) = cli.session_file {
        config.session_file = Some(path);
    }
    let flavor = cli.app.unwrap_or(config.app);

    match cli.command {
        Commands::Login { email, password } => {
            let session = Session::open(&config, flavor).await?;
            commands::login(&session, &email, &password).await
        }
        Commands::Register {
            email,
            password,
            confirm,
            sign_in,
        } => {
            let session = Session::open(&config, flavor).await?;
            commands::register(&session, &email, &password, confirm.as_deref(), sign_in).await
        }
        Commands::Logout => {
            let session = Session::open(&config, flavor).await?;
            commands::logout(&session).await
        }
        Commands::Status => {
            let session = Session::open(&config, flavor).await?;
            Ok(commands::status(&session))
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => Ok(commands::config_show(
                &config,
                config_path.as_deref(),
                flavor,
            )),
            ConfigCommands::SetUrl { url } => {
                let path = config_path
                    .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;
                commands::config_set_url(&path, &url)
            }
        },
        Commands::Version => Ok(format!("servicehub {}", env!("CARGO_PKG_VERSION"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_after_subcommand() {
        let cli = Cli::try_parse_from(["servicehub", "status", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["servicehub", "logout", "--app", "admin", "-v"]).unwrap();
        assert_eq!(cli.app, Some(AppFlavor::Admin));
        assert_eq!(cli.verbose, 1);
    }
}
