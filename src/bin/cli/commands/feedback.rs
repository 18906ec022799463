use clap::Subcommand;
use stargazer::dto::CreateFeedbackDto;

use crate::client::StargazerClient;
use crate::output::{self, OutputConfig};

/// Feedback commands
#[derive(Subcommand, Debug)]
pub enum FeedbackCommands {
    /// List all feedback, newest first
    List,
    /// Send feedback
    Send {
        /// Your name
        #[clap(long)]
        name: String,
        /// Your email address
        #[clap(long)]
        email: String,
        /// The feedback message
        #[clap(long)]
        message: String,
        /// Rating from 1 to 5
        #[clap(long)]
        rating: Option<i64>,
    },
}

/// Executes a feedback command
pub async fn execute(
    client: &StargazerClient,
    cmd: FeedbackCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        FeedbackCommands::List => {
            let entries = client.list_feedback().await?;
            output::print_feedback_list(&entries, config);
        }
        FeedbackCommands::Send { name, email, message, rating } => {
            let dto = CreateFeedbackDto {
                name: Some(name),
                email: Some(email),
                message: Some(message),
                rating,
            };
            let response = client.send_feedback(&dto).await?;
            output::print_feedback(&response.message, &response.feedback, config);
        }
    }
    Ok(())
}
