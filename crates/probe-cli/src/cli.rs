use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use probe_client::EntityId;

use crate::scenarios::Scenario;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT_HASH"), ")");

#[derive(Parser)]
#[command(name = "kanban-probe")]
#[command(about = "Exercise a kanban board REST API and print every exchange", long_about = None)]
#[command(version = VERSION)]
pub struct Cli {
    /// API base URL, e.g. http://localhost:8080/api
    #[arg(long, global = true, env = "KANBAN_PROBE_BASE_URL")]
    pub base_url: Option<String>,

    /// Path to a config file (defaults to <config dir>/kanban-probe/config.toml)
    #[arg(long, global = true, env = "KANBAN_PROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bearer token for ad hoc endpoint commands
    #[arg(long, global = true, env = "KANBAN_PROBE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Wait before the first scenario request, in milliseconds
    #[arg(long, global = true)]
    pub startup_delay_ms: Option<u64>,

    /// Per-request timeout, in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable request/response transcript
    Text,
    /// One JSON envelope on stdout
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a scripted scenario against the API
    Run(RunArgs),
    /// Authentication endpoints
    Auth(AuthCommand),
    /// Board endpoints
    Board(BoardCommand),
    /// List endpoints
    List(ListCommand),
    /// Card endpoints
    Card(CardCommand),
    /// Comment endpoints
    Comment(CommentCommand),
    /// Serve an in-memory mock of the API
    ServeMock {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args)]
pub struct RunArgs {
    #[arg(value_enum)]
    pub scenario: Scenario,
    /// Exit with code 1 when any step fails, not only on aborts
    #[arg(long)]
    pub strict: bool,
}

// Auth commands
#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub action: AuthAction,
}

#[derive(Subcommand)]
pub enum AuthAction {
    /// Register a user (a fresh address is generated when --email is omitted)
    Register {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Log in and print the issued token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
}

// Board commands
#[derive(Args)]
pub struct BoardCommand {
    #[command(subcommand)]
    pub action: BoardAction,
}

#[derive(Subcommand)]
pub enum BoardAction {
    /// List boards visible to the token's user
    List,
    /// Get a specific board
    Get {
        #[arg(long)]
        id: EntityId,
    },
    /// Create a board
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Update a board
    Update(BoardUpdateArgs),
    /// Delete a board
    Delete {
        #[arg(long)]
        id: EntityId,
    },
    /// List the members of a board
    Members {
        #[arg(long)]
        id: EntityId,
    },
}

#[derive(Args)]
pub struct BoardUpdateArgs {
    #[arg(long)]
    pub id: EntityId,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

// List commands
#[derive(Args)]
pub struct ListCommand {
    #[command(subcommand)]
    pub action: ListAction,
}

#[derive(Subcommand)]
pub enum ListAction {
    /// List lists, optionally filtered by board
    List {
        #[arg(long)]
        board_id: Option<EntityId>,
    },
    /// Get a specific list
    Get {
        #[arg(long)]
        id: EntityId,
    },
    /// Create a list
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        board_id: EntityId,
    },
    /// Update a list
    Update(ListUpdateArgs),
    /// Delete a list
    Delete {
        #[arg(long)]
        id: EntityId,
    },
}

#[derive(Args)]
pub struct ListUpdateArgs {
    #[arg(long)]
    pub id: EntityId,
    #[arg(long)]
    pub title: Option<String>,
    /// Move the list to another board
    #[arg(long)]
    pub board_id: Option<EntityId>,
}

// Card commands
#[derive(Args)]
pub struct CardCommand {
    #[command(subcommand)]
    pub action: CardAction,
}

#[derive(Subcommand)]
pub enum CardAction {
    /// List cards, optionally filtered by list
    List {
        #[arg(long)]
        list_id: Option<EntityId>,
    },
    /// Get a specific card
    Get {
        #[arg(long)]
        id: EntityId,
    },
    /// Create a card
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        list_id: EntityId,
        #[arg(long)]
        description: Option<String>,
    },
    /// Update a card
    Update(CardUpdateArgs),
    /// Delete a card
    Delete {
        #[arg(long)]
        id: EntityId,
    },
}

#[derive(Args)]
pub struct CardUpdateArgs {
    #[arg(long)]
    pub id: EntityId,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Move the card to another list
    #[arg(long)]
    pub list_id: Option<EntityId>,
}

// Comment commands
#[derive(Args)]
pub struct CommentCommand {
    #[command(subcommand)]
    pub action: CommentAction,
}

#[derive(Subcommand)]
pub enum CommentAction {
    /// List the comments of a card
    List {
        #[arg(long)]
        card_id: EntityId,
    },
    /// Comment on a card
    Create {
        #[arg(long)]
        card_id: EntityId,
        #[arg(long)]
        text: String,
    },
    /// Edit a comment
    Update {
        #[arg(long)]
        id: EntityId,
        #[arg(long)]
        text: String,
    },
    /// Delete a comment
    Delete {
        #[arg(long)]
        id: EntityId,
    },
}
