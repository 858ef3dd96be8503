//! CLI module for Tubechat.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Tubechat - Chat with YouTube videos
///
/// Fetches video transcripts, indexes them in an in-memory vector store, and
/// answers questions about them with an LLM.
#[derive(Parser, Debug)]
#[command(name = "tubechat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server with the web UI
    Serve {
        /// Bind host (overrides configuration)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides configuration)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Persistent multi-session chat with the assistant
    Chat {
        /// Session to open on startup
        #[arg(short, long)]
        session: Option<String>,

        /// Model to use (overrides configuration)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Load one or more videos and ask questions about them interactively
    Video {
        /// YouTube URLs or bare 11-character video IDs
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Model to use (overrides configuration)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Ask questions about a built-in sample document (no video required)
    Demo,
}
