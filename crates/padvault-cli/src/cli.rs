use clap::{Parser, Subcommand};
use uuid::Uuid;

use padvault_core::VERSION;

/// PadVault - zero-knowledge encrypted pads addressed by a secret code
#[derive(Parser)]
#[command(name = "padvault")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the pad store database
    #[arg(short, long, global = true, env = "PADVAULT_STORE")]
    pub store: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the pad store database
    Init,

    /// Create a new pad
    Create {
        /// Pad content (otherwise read from stdin)
        #[arg(long)]
        text: Option<String>,

        /// Protect the pad with a second lock code
        #[arg(long)]
        locked: bool,
    },

    /// Open a pad and print its content
    Open {
        /// Also print pad metadata
        #[arg(long)]
        meta: bool,
    },

    /// Save new content to an existing pad
    Save {
        /// Pad content (otherwise read from stdin)
        #[arg(long)]
        text: Option<String>,
    },

    /// Set or clear a pad's self-destruct time
    Settings {
        /// Self-destruct at this time (RFC 3339)
        #[arg(long, value_name = "WHEN", conflicts_with = "clear")]
        at: Option<String>,

        /// Clear the self-destruct time
        #[arg(long)]
        clear: bool,
    },

    /// Inspect and restore revision history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },

    /// Delete pads whose self-destruct time has passed
    Sweep {
        /// Sweep secret, when the store requires one
        #[arg(long)]
        secret: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List retained revisions, newest first
    List,

    /// Restore a revision onto the pad
    Restore {
        /// Revision to restore
        #[arg(value_name = "REVISION_ID")]
        revision_id: Uuid,
    },

    /// Delete all revisions
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}
