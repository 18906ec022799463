use clap::Subcommand;

use crate::client::StargazerClient;
use crate::output::{self, OutputConfig};

/// NASA gallery commands
#[derive(Subcommand, Debug)]
pub enum NasaCommands {
    /// Show random Astronomy Pictures of the Day
    Apod {
        /// Number of pictures to fetch (1-100)
        #[clap(long, default_value_t = 5)]
        count: u32,
    },
    /// Show the latest EPIC images of Earth
    Epic,
    /// Show Mars rover photos
    Mars {
        /// Rover name (curiosity, opportunity, spirit, perseverance)
        #[clap(long, default_value = "curiosity")]
        rover: String,
        /// Martian sol
        #[clap(long, default_value_t = 1000)]
        sol: u32,
    },
    /// Show the Near Earth Object feed
    Neo {
        /// First day of the window (YYYY-MM-DD, defaults to today)
        #[clap(long)]
        start_date: Option<String>,
        /// Last day of the window (YYYY-MM-DD, defaults to a week from today)
        #[clap(long)]
        end_date: Option<String>,
    },
}

/// Executes a NASA command
pub async fn execute(
    client: &StargazerClient,
    cmd: NasaCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        NasaCommands::Apod { count } => {
            let entries = client.apod(count).await?;
            output::print_apod(&entries, config);
        }
        NasaCommands::Epic => {
            let images = client.epic().await?;
            output::print_epic(&images, config);
        }
        NasaCommands::Mars { rover, sol } => {
            let photos = client.mars_photos(&rover, sol).await?;
            output::print_mars_photos(&photos, config);
        }
        NasaCommands::Neo { start_date, end_date } => {
            let feed = client.neo(start_date, end_date).await?;
            output::print_neo(&feed, config);
        }
    }
    Ok(())
}
