//! Prompt templates for Tubechat.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub rag: RagPrompts,
    pub document: DocumentPrompts,
    pub chat: ChatPrompts,
}

/// Prompts for transcript-backed RAG answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub system: String,
    pub user: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: "You are an assistant that answers ONLY based on the given video \
                     transcript context. If the answer is not in the transcript, say: \
                     'Not found in the video transcript.'"
                .to_string(),
            user: "Question: {{question}}\n\nRelevant transcript parts:\n{{context}}"
                .to_string(),
        }
    }
}

/// Prompts for RAG answers over a standalone document (demo mode).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentPrompts {
    pub system: String,
    pub user: String,
}

impl Default for DocumentPrompts {
    fn default() -> Self {
        Self {
            system: "Answer ONLY based on the context. If the answer is not in the \
                     text, say 'Not found in the document.'"
                .to_string(),
            user: "Question: {{question}}\n\nContext:\n{{context}}".to_string(),
        }
    }
}

/// Prompts for the persistent chat assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatPrompts {
    pub system: String,
}

impl Default for ChatPrompts {
    fn default() -> Self {
        Self {
            system: "You are a friendly personal assistant. Answer briefly and clearly."
                .to_string(),
        }
    }
}

/// Render a template, replacing `{{name}}` placeholders with the given values.
pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{{{}}}}}", name), value);
    }
    out
}
