mod client;
mod commands;
mod output;

use clap::{Parser, Subcommand};
use client::StargazerClient;
use output::{OutputConfig, OutputFormat};
use stargazer::config;
use std::process;

/// CLI for the Stargazer NASA gallery
#[derive(Parser, Debug)]
#[clap(name = "stargazer-cli", about = "CLI for the Stargazer NASA gallery")]
struct Cli {
    /// Server URL to connect to
    #[clap(long, env = "STARGAZER_URL", global = true)]
    server_url: Option<String>,

    /// Session token to act as (printed by `account login`)
    #[clap(long, env = "STARGAZER_SESSION", global = true, hide_env_values = true)]
    session: Option<String>,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    format: OutputFormat,

    /// Quiet mode: minimal output (just IDs or tokens)
    #[clap(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Browse NASA imagery and data
    #[command(subcommand)]
    Nasa(commands::nasa::NasaCommands),
    /// Manage favorites
    #[command(subcommand)]
    Favorite(commands::favorite::FavoriteCommands),
    /// Send and read feedback
    #[command(subcommand)]
    Feedback(commands::feedback::FeedbackCommands),
    /// Register, log in and out
    #[command(subcommand)]
    Account(commands::account::AccountCommands),
}

/// Resolves the server URL from CLI args, config file, or defaults
///
/// Precedence: CLI flag / env var > config file > http://localhost:3000
fn resolve_server_url(cli_url: Option<String>) -> String {
    if let Some(url) = cli_url {
        return url;
    }

    let config_path = config::get_config_dir_path().map(|dir| dir.join("config.toml"));
    if let Some(path) = config_path {
        if let Ok(update) = config::config_from_file(Some(path)) {
            if let Some(url) = update.server_url {
                return url;
            }
        }
    }

    "http://localhost:3000".to_string()
}

/// Formats an error for human-readable stderr output
fn format_error(err: &dyn std::error::Error) -> String {
    let err_string = err.to_string();

    // reqwest hides the io error behind "error sending request"
    if err_string.contains("error sending request")
        || err_string.contains("connection refused")
        || err_string.contains("Connection refused")
        || err_string.contains("tcp connect error")
    {
        return format!(
            "Could not connect to server. Is stargazer running?\n  {}",
            err_string
        );
    }

    err_string
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let server_url = resolve_server_url(cli.server_url);
    let client = StargazerClient::new(server_url, cli.session);
    let output_config = OutputConfig {
        format: cli.format,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Nasa(cmd) => commands::nasa::execute(&client, cmd, &output_config).await,
        Commands::Favorite(cmd) => commands::favorite::execute(&client, cmd, &output_config).await,
        Commands::Feedback(cmd) => commands::feedback::execute(&client, cmd, &output_config).await,
        Commands::Account(cmd) => commands::account::execute(&client, cmd, &output_config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", format_error(e.as_ref()));
        process::exit(1);
    }
}
