//! Tubechat - Chat with YouTube videos
//!
//! Fetches YouTube video transcripts, indexes them in an in-memory vector
//! store, and answers natural-language questions about them with an LLM
//! using retrieval-augmented generation.
//!
//! # Overview
//!
//! Tubechat allows you to:
//! - Load one or more videos into a session and ask questions against all of them
//! - Add and remove videos from the active session (the index is rebuilt each time)
//! - Run an HTTP server with a small web UI over the same session operations
//! - Keep persistent, named chat sessions with an assistant, stored as JSON files
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `transcript` - Video ID extraction and caption fetching
//! - `chunking` - Recursive character text splitting
//! - `embedding` - Embedding generation
//! - `vector_store` - In-memory vector index
//! - `llm` - Chat completion abstraction
//! - `pipeline` - RAG pipeline (chunk, embed, index, answer)
//! - `session` - Session/corpus coordination and rebuild-on-mutation
//! - `chat_store` - Flat-file persistence for chat histories
//!
//! # Example
//!
//! ```rust,no_run
//! use tubechat::config::Settings;
//! use tubechat::session::SessionCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let mut coordinator = SessionCoordinator::new(&settings)?;
//!
//!     let outcome = coordinator.initialize(&["dQw4w9WgXcQ".to_string()]).await?;
//!     println!("Loaded {} video(s)", outcome.video_ids.len());
//!
//!     let answer = coordinator.query("What is this video about?").await?;
//!     println!("{}", answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chat_store;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod openai;
pub mod pipeline;
pub mod session;
pub mod transcript;
pub mod vector_store;

pub use error::{Result, TubechatError};
