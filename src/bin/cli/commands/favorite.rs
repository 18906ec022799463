use clap::Subcommand;
use serde_json::Value;
use stargazer::dto::CreateFavoriteDto;

use crate::client::StargazerClient;
use crate::output::{self, OutputConfig};

/// Favorite management commands
///
/// Without `--session` every invocation runs as a fresh guest, so favorites
/// only persist across commands when a session token is passed along.
#[derive(Subcommand, Debug)]
pub enum FavoriteCommands {
    /// List favorites for the current session
    List,
    /// Save an item as a favorite
    Add {
        /// Kind of item (apod, epic, mars, neo, ...)
        #[clap(long)]
        item_type: String,
        /// Identifier of the item within its kind
        #[clap(long)]
        item_id: String,
        /// Display title
        #[clap(long)]
        title: String,
        /// Image URL
        #[clap(long)]
        image_url: Option<String>,
        /// Description
        #[clap(long)]
        description: Option<String>,
        /// Extra metadata as a JSON string
        #[clap(long)]
        metadata: Option<String>,
    },
    /// Remove a favorite
    Remove {
        /// The favorite ID
        id: String,
    },
}

/// Executes a favorite command
pub async fn execute(
    client: &StargazerClient,
    cmd: FavoriteCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        FavoriteCommands::List => {
            let favorites = client.list_favorites().await?;
            output::print_favorites(&favorites, config);
        }
        FavoriteCommands::Add { item_type, item_id, title, image_url, description, metadata } => {
            let dto = CreateFavoriteDto {
                item_type: Some(item_type),
                item_id: Some(item_id),
                title: Some(title),
                image_url,
                description,
                // The server parses and validates the string
                metadata: metadata.map(Value::String),
            };
            let response = client.add_favorite(&dto).await?;
            output::print_favorite(&response.body.message, &response.body.favorite, config);
        }
        FavoriteCommands::Remove { id } => {
            let response = client.remove_favorite(&id).await?;
            output::print_success(&response.message, config);
        }
    }
    Ok(())
}
