use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;
use stargazer::models::{Favorite, Feedback, User};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Bundled output configuration passed to all print functions
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    /// The output format
    pub format: OutputFormat,
    /// When true, print minimal output (just IDs or tokens)
    pub quiet: bool,
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(err) => eprintln!("Failed to encode output: {}", err),
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("-")
}

/// Prints a list of APOD entries
pub fn print_apod(entries: &Value, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            let entries = entries.as_array().map(Vec::as_slice).unwrap_or_default();
            for entry in entries {
                if config.quiet {
                    println!("{}", str_field(entry, "url"));
                    continue;
                }
                println!("{}  {}", str_field(entry, "date"), str_field(entry, "title"));
                println!("            {}", str_field(entry, "url"));
            }
        }
        OutputFormat::Json => print_json(entries),
    }
}

/// Prints a list of EPIC images
pub fn print_epic(images: &Value, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            let images = images.as_array().map(Vec::as_slice).unwrap_or_default();
            if images.is_empty() {
                if !config.quiet {
                    println!("No EPIC images available.");
                }
                return;
            }
            for image in images {
                if config.quiet {
                    println!("{}", str_field(image, "image_url"));
                    continue;
                }
                println!("{}  {}", str_field(image, "date"), str_field(image, "image_url"));
            }
        }
        OutputFormat::Json => print_json(images),
    }
}

/// Prints a list of Mars rover photos
pub fn print_mars_photos(photos: &Value, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            let photos = photos.as_array().map(Vec::as_slice).unwrap_or_default();
            if photos.is_empty() {
                if !config.quiet {
                    println!("No photos found.");
                }
                return;
            }
            for photo in photos {
                let id = photo.get("id").map(Value::to_string).unwrap_or_else(|| "-".to_string());
                let src = str_field(photo, "img_src");
                if config.quiet {
                    println!("{}", src);
                    continue;
                }
                let camera = photo.get("camera").map(|c| str_field(c, "full_name")).unwrap_or("-");
                println!("{:<8}  {:<40}  {}", id, camera, src);
            }
        }
        OutputFormat::Json => print_json(photos),
    }
}

/// Prints a Near Earth Object feed as one line per object
pub fn print_neo(feed: &Value, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            let Some(days) = feed.get("near_earth_objects").and_then(Value::as_object) else {
                if !config.quiet {
                    println!("No near earth objects found.");
                }
                return;
            };
            if !config.quiet {
                let count = feed.get("element_count").and_then(Value::as_u64).unwrap_or(0);
                println!("{} objects", count);
            }
            // Dates are keys of a JSON object, which is not ordered
            let mut dates: Vec<&String> = days.keys().collect();
            dates.sort();
            for date in dates {
                for object in days[date].as_array().map(Vec::as_slice).unwrap_or_default() {
                    let hazardous = object
                        .get("is_potentially_hazardous_asteroid")
                        .and_then(Value::as_bool)
                        .unwrap_or(false);
                    if config.quiet {
                        println!("{}", str_field(object, "name"));
                        continue;
                    }
                    println!(
                        "{}  {}{}",
                        date,
                        str_field(object, "name"),
                        if hazardous { "  (potentially hazardous)" } else { "" }
                    );
                }
            }
        }
        OutputFormat::Json => print_json(feed),
    }
}

/// Prints a list of favorites
pub fn print_favorites(favorites: &[Favorite], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if favorites.is_empty() {
                if !config.quiet {
                    println!("No favorites found.");
                }
                return;
            }
            if config.quiet {
                for favorite in favorites {
                    println!("{}", favorite.get_id());
                }
                return;
            }
            let max_id = favorites.iter().map(|f| f.get_id().len()).max().unwrap_or(2);
            println!("{:<width$}  {:<6}  TITLE", "ID", "TYPE", width = max_id);
            for favorite in favorites {
                println!(
                    "{:<width$}  {:<6}  {}",
                    favorite.get_id(),
                    favorite.get_item_type(),
                    favorite.get_title(),
                    width = max_id,
                );
            }
        }
        OutputFormat::Json => print_json(favorites),
    }
}

/// Prints a single favorite with the server's message
pub fn print_favorite(message: &str, favorite: &Favorite, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", favorite.get_id());
                return;
            }
            println!("{}", message);
            println!("ID:      {}", favorite.get_id());
            println!("Item:    {} {}", favorite.get_item_type(), favorite.get_item_id());
            println!("Title:   {}", favorite.get_title());
            println!("Created: {}", favorite.get_created_at());
        }
        OutputFormat::Json => print_json(favorite),
    }
}

/// Prints a list of feedback entries
pub fn print_feedback_list(entries: &[Feedback], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if entries.is_empty() {
                if !config.quiet {
                    println!("No feedback yet.");
                }
                return;
            }
            for entry in entries {
                if config.quiet {
                    println!("{}", entry.get_id());
                    continue;
                }
                println!(
                    "{}  {}  {} <{}>",
                    "*".repeat(entry.get_rating().clamp(0, 5) as usize),
                    entry.get_created_at().format("%Y-%m-%d"),
                    entry.get_name(),
                    entry.get_email(),
                );
                println!("    {}", entry.get_message());
            }
        }
        OutputFormat::Json => print_json(entries),
    }
}

/// Prints a stored feedback entry
pub fn print_feedback(message: &str, entry: &Feedback, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", entry.get_id());
            } else {
                println!("{}", message);
            }
        }
        OutputFormat::Json => print_json(entry),
    }
}

/// Prints the current user, if any
pub fn print_user(user: Option<&User>, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => match user {
            Some(user) if config.quiet => println!("{}", user.get_email()),
            Some(user) => {
                println!("ID:     {}", user.get_id());
                println!("Name:   {}", user.get_name());
                println!("Email:  {}", user.get_email());
                if user.get_google_id().is_some() {
                    println!("Google: linked");
                }
            }
            None => {
                if !config.quiet {
                    println!("Not logged in.");
                }
            }
        },
        OutputFormat::Json => print_json(&serde_json::json!({ "user": user })),
    }
}

/// Prints a session token handed out by the server
pub fn print_session(message: &str, session: Option<&str>, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                if let Some(token) = session {
                    println!("{}", token);
                }
                return;
            }
            println!("{}", message);
            if let Some(token) = session {
                println!("Session: {}", token);
                println!("Reuse it with --session {} or STARGAZER_SESSION", token);
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({ "message": message, "session": session })),
    }
}

/// Prints a success message
pub fn print_success(message: &str, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if !config.quiet {
                println!("{}", message);
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({ "message": message })),
    }
}
