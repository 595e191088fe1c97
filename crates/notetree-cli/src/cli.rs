use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "notetree")]
#[command(about = "Browse and edit hierarchical notes from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Service origin, overriding the config file and environment
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show or initialize the client configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Log in, register and manage the stored session
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Work with notes
    Notes {
        #[command(subcommand)]
        command: NoteCommands,
    },
    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// GET an API path and print or save the response
    Fetch {
        /// Path below the API root, e.g. /v1/notes
        path: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write the config file
    Init {
        /// Service origin
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
        /// Tenant code sent with every request
        #[arg(long, value_name = "CODE")]
        tenant: Option<String>,
        /// Directory downloads are saved to
        #[arg(long, value_name = "DIR")]
        download_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Log in and store the session in the keychain
    Login {
        #[arg(long, value_name = "EMAIL")]
        email: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Create an account (does not log in)
    Register {
        #[arg(long, value_name = "NAME")]
        username: String,
        #[arg(long, value_name = "EMAIL")]
        email: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Log out and clear the stored session
    Logout,
    /// Show the logged-in user
    Status,
}

#[derive(Subcommand)]
pub enum NoteCommands {
    /// Show notes as a tree
    Tree {
        /// Show trashed notes instead of normal ones
        #[arg(long)]
        trashed: bool,
        /// Only favorites
        #[arg(long)]
        favorites: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one note
    Show {
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a note
    #[command(alias = "new")]
    Add {
        #[arg(long)]
        title: String,
        /// Parent note ID (top level when omitted)
        #[arg(long, value_name = "ID")]
        parent: Option<i64>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Change a note's title
    Rename {
        id: i64,
        #[arg(long)]
        title: String,
    },
    /// Move a note to the trash
    Trash { id: i64 },
    /// Restore a trashed note
    Restore { id: i64 },
    /// Delete a note permanently
    Delete { id: i64 },
    /// Toggle a note's favorite flag
    Favorite { id: i64 },
    /// Set a note's sibling position
    Move {
        id: i64,
        #[arg(long)]
        position: i64,
    },
    /// Write a note to FILE and sync edits of FILE back until Ctrl-C
    Watch {
        id: i64,
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Show a user's profile
    Show { id: i64 },
    /// Update a user's profile
    Update {
        id: i64,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Change a user's password
    Password {
        id: i64,
        #[arg(long, value_name = "PASSWORD")]
        new_password: String,
    },
}
