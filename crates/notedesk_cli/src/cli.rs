use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "notedesk")]
#[command(version, about = "Personal notes: create, archive, search and export")]
#[command(propagate_version = true)]
pub struct Cli {
    /// SQLite database path (overrides NOTEDESK_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Session token returned by signup/login
    #[arg(long, global = true, env = "NOTEDESK_SESSION", hide_env_values = true)]
    pub session: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a local user and print a session token
    Signup { username: String, password: String },

    /// Log in a local user and print a session token
    Login { username: String, password: String },

    /// Complete a GitHub login for an already verified profile
    GithubLogin {
        /// GitHub numeric user id
        #[arg(long)]
        external_id: String,

        #[arg(long)]
        username: String,

        #[arg(long)]
        avatar_url: Option<String>,
    },

    /// Revoke the current session
    Logout,

    /// Show the user behind the current session
    Whoami,

    /// List notes in an age bucket
    List {
        /// 1month, 3months, alltime or archive
        #[arg(long, default_value = "1month")]
        age: String,

        /// 1-based page number
        #[arg(long)]
        page: Option<String>,
    },

    /// Search note titles (case-insensitive, archived notes included)
    Search { term: String },

    /// Create a note
    Create { title: String, text: String },

    /// Show one note
    Get { id: String },

    /// Replace title and text of a note
    Edit {
        id: String,
        title: String,
        text: String,
    },

    /// Move a note to the archive
    Archive { id: String },

    /// Move a note out of the archive
    Unarchive { id: String },

    /// Permanently delete a note
    Delete { id: String },

    /// Permanently delete every archived note
    DeleteArchived,

    /// Export a note as a PDF document
    Export {
        id: String,

        /// Write plain text instead of PDF
        #[arg(long)]
        text: bool,

        /// Output file (defaults to a name derived from the title)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },
}
