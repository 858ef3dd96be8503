//! Configuration management for Tubechat.

mod prompts;
mod settings;

pub use prompts::{render, ChatPrompts, DocumentPrompts, Prompts, RagPrompts};
pub use settings::{
    ChatSettings, ChunkingSettings, EmbeddingSettings, GeneralSettings, RagSettings,
    ServerSettings, Settings, TranscriptSettings,
};
