use clap::Subcommand;
use stargazer::dto::{LoginDto, RegisterDto};

use crate::client::StargazerClient;
use crate::output::{self, OutputConfig};

/// Account commands
///
/// Register and login print the session token of the logged-in session.
/// Pass it back with `--session` to act as that user.
#[derive(Subcommand, Debug)]
pub enum AccountCommands {
    /// Create an account and log in
    Register {
        #[clap(long)]
        name: String,
        #[clap(long)]
        email: String,
        #[clap(long, env = "STARGAZER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log in with email and password
    Login {
        #[clap(long)]
        email: String,
        #[clap(long, env = "STARGAZER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out of the current session
    Logout,
    /// Show the user bound to the current session
    Whoami,
}

/// Executes an account command
pub async fn execute(
    client: &StargazerClient,
    cmd: AccountCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        AccountCommands::Register { name, email, password } => {
            let dto = RegisterDto {
                name: Some(name),
                email: Some(email),
                password_confirmation: Some(password.clone()),
                password: Some(password),
            };
            let response = client.register(&dto).await?;
            output::print_session(&response.body.message, response.session.as_deref(), config);
        }
        AccountCommands::Login { email, password } => {
            let dto = LoginDto {
                email: Some(email),
                password: Some(password),
            };
            let response = client.login(&dto).await?;
            output::print_session(&response.body.message, response.session.as_deref(), config);
        }
        AccountCommands::Logout => {
            let response = client.logout().await?;
            output::print_success(&response.body.message, config);
        }
        AccountCommands::Whoami => {
            let response = client.me().await?;
            output::print_user(response.user.as_ref(), config);
        }
    }
    Ok(())
}
