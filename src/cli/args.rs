use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::events::DateFilter;

#[derive(Parser, Debug)]
#[command(name = "eventhub")]
#[command(version)]
#[command(about = "Browse, create and join events from the terminal", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the API base URL (e.g. http://localhost:5000/api)
    #[arg(long, env = "EVENTHUB_BASE_URL", global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration
    Init,
    /// Log in and remember the session
    Login {
        email: String,
        /// Read from EVENTHUB_PASSWORD when omitted
        #[arg(env = "EVENTHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account (logs you in)
    Register {
        name: String,
        email: String,
        #[arg(env = "EVENTHUB_PASSWORD", hide_env_values = true)]
        password: String,
        /// Profile picture URL
        #[arg(long)]
        photo_url: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Work with events
    #[command(subcommand)]
    Events(EventCommands),
}

#[derive(Subcommand, Debug)]
pub enum EventCommands {
    /// List events
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Events per page (defaults to the configured page size)
        #[arg(long)]
        limit: Option<u32>,
        /// Search event titles
        #[arg(short, long)]
        search: Option<String>,
        /// Date range
        #[arg(short, long, value_enum, default_value_t = DateFilter::All)]
        filter: DateFilter,
    },
    /// Show one event
    Show { id: String },
    /// Create an event
    Create(EventFields),
    /// Update an event; omitted fields keep their current value
    Update {
        id: String,
        #[command(flatten)]
        fields: EventUpdate,
    },
    /// Delete an event you created
    Delete { id: String },
    /// Join an event
    Join { id: String },
    /// Events you created
    Mine,
}

#[derive(Args, Debug, Clone)]
pub struct EventFields {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub organizer: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub date: String,
    /// HH:MM
    #[arg(long)]
    pub time: String,
    #[arg(long)]
    pub location: String,
    #[arg(long)]
    pub description: String,
}

#[derive(Args, Debug, Clone, Default)]
pub struct EventUpdate {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub organizer: Option<String>,
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub time: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list_with_filter() {
        let cli = Cli::parse_from([
            "eventhub", "events", "list", "--filter", "current-week", "-s", "rust", "--page", "2",
        ]);
        match cli.command {
            Commands::Events(EventCommands::List { page, search, filter, limit }) => {
                assert_eq!(page, 2);
                assert_eq!(search.as_deref(), Some("rust"));
                assert_eq!(filter, DateFilter::CurrentWeek);
                assert_eq!(limit, None);
            }
            other => panic!("Unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_update_keeps_unset_fields_empty() {
        let cli = Cli::parse_from(["eventhub", "events", "update", "e1", "--title", "New"]);
        match cli.command {
            Commands::Events(EventCommands::Update { id, fields }) => {
                assert_eq!(id, "e1");
                assert_eq!(fields.title.as_deref(), Some("New"));
                assert!(fields.location.is_none());
            }
            other => panic!("Unexpected command {:?}", other),
        }
    }
}
