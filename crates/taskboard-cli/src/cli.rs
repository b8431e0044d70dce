use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use taskboard_core::StorageBackendKind;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Boards, columns and cards with ordered drag-and-drop moves", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the store file (or set TASKBOARD_STORE env var)
    #[arg(long, global = true, value_name = "PATH", env = "TASKBOARD_STORE")]
    pub store: Option<PathBuf>,

    /// Storage backend: json, memory or sqlite
    #[arg(long, global = true, env = "TASKBOARD_BACKEND")]
    pub backend: Option<StorageBackendKind>,

    /// Config file; defaults to the platform config directory
    #[arg(long, global = true, value_name = "FILE", env = "TASKBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Acting user
    #[arg(long, global = true, env = "TASKBOARD_USER")]
    pub user: Option<Uuid>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Board operations
    Board(BoardCommand),
    /// Column operations
    Column(ColumnCommand),
    /// Card operations
    Card(CardCommand),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
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
    /// Create a board owned by the acting user
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// public or private
        #[arg(long = "type", default_value = "public")]
        board_type: String,
    },
    /// List the acting user's boards, sorted by title
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        items_per_page: Option<u32>,
    },
    /// Get a board with its columns and cards
    Get {
        #[arg(long)]
        id: Uuid,
    },
    /// Update a board
    Update(BoardUpdateArgs),
    /// Delete a board
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    /// Add a member to a board
    AddMember {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        member: Uuid,
    },
}

#[derive(Args)]
pub struct BoardUpdateArgs {
    #[arg(long)]
    pub id: Uuid,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long = "type")]
    pub board_type: Option<String>,
    /// New column order, comma separated
    #[arg(long, value_delimiter = ',', num_args = 0..)]
    pub column_order: Option<Vec<String>>,
    /// Raw JSON update body; keys outside the writable fields are ignored
    #[arg(long)]
    pub json: Option<String>,
}

// Column commands
#[derive(Args)]
pub struct ColumnCommand {
    #[command(subcommand)]
    pub action: ColumnAction,
}

#[derive(Subcommand)]
pub enum ColumnAction {
    /// Create a column at the end of a board
    Create {
        #[arg(long)]
        board_id: String,
        #[arg(long)]
        title: String,
    },
    /// Update a column
    Update {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        /// New card order, comma separated
        #[arg(long, value_delimiter = ',', num_args = 0..)]
        card_order: Option<Vec<String>>,
    },
    /// Delete a column and its cards
    Delete {
        #[arg(long)]
        id: Uuid,
    },
}

// Card commands
#[derive(Args)]
pub struct CardCommand {
    #[command(subcommand)]
    pub action: CardAction,
}

#[derive(Subcommand)]
pub enum CardAction {
    /// Create a card at the end of a column
    Create {
        #[arg(long)]
        board_id: String,
        #[arg(long)]
        column_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Update a card
    Update {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
    },
    /// Delete a card
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    /// Move a card to another column with the client-computed final orders
    Move(CardMoveArgs),
}

#[derive(Args)]
pub struct CardMoveArgs {
    #[arg(long)]
    pub card_id: Option<String>,
    #[arg(long)]
    pub prev_column_id: Option<String>,
    /// Final order of the source column, comma separated
    #[arg(long, value_delimiter = ',', num_args = 0..)]
    pub prev_order: Option<Vec<String>>,
    #[arg(long)]
    pub next_column_id: Option<String>,
    /// Final order of the target column, comma separated
    #[arg(long, value_delimiter = ',', num_args = 0..)]
    pub next_order: Option<Vec<String>>,
}
