//! Persistent chat session storage.
//!
//! Each named session is one JSON file on disk holding the full message
//! history as an array of `{role, content}` objects. Writes always persist
//! the entire history; there is no file locking, concurrent writers are
//! last-writer-wins.

use crate::error::Result;
use crate::llm::{ChatMessage, Role};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Flat-file store for chat histories, one JSON file per session.
pub struct ChatStore {
    dir: PathBuf,
    system_prompt: String,
}

impl ChatStore {
    /// Create a store rooted at the given directory.
    pub fn new(dir: impl Into<PathBuf>, system_prompt: &str) -> Self {
        Self {
            dir: dir.into(),
            system_prompt: system_prompt.to_string(),
        }
    }

    /// Path of a session's JSON file. Spaces in names become underscores.
    pub fn session_path(&self, session: &str) -> PathBuf {
        let safe_name = session.replace(' ', "_");
        self.dir.join(format!("{}.json", safe_name))
    }

    /// History containing only the initial system turn.
    pub fn initial_history(&self) -> Vec<ChatMessage> {
        vec![ChatMessage::system(self.system_prompt.clone())]
    }

    /// Load a session's history, creating it if the file does not exist.
    ///
    /// Entries with roles other than system/user/assistant, or without a
    /// string content, are dropped; the rest of the history survives. An
    /// unreadable file or one that is not a JSON array is silently replaced
    /// with a fresh initial history rather than surfaced as an error.
    pub fn load_or_create(&self, session: &str) -> Result<Vec<ChatMessage>> {
        self.ensure_dir()?;
        let path = self.session_path(session);

        if !path.exists() {
            let history = self.initial_history();
            self.save(session, &history)?;
            return Ok(history);
        }

        let parsed = std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|content| parse_history(&content).map_err(|e| e.to_string()));

        match parsed {
            Ok(history) if !history.is_empty() => Ok(history),
            Ok(_) => Ok(self.initial_history()),
            Err(e) => {
                warn!("Session file {} is unreadable ({}), starting fresh", path.display(), e);
                let history = self.initial_history();
                self.save(session, &history)?;
                Ok(history)
            }
        }
    }

    /// Persist the full history for a session.
    pub fn save(&self, session: &str, history: &[ChatMessage]) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_json::to_string_pretty(history)?;
        std::fs::write(self.session_path(session), content)?;
        Ok(())
    }

    /// Reset a session to just its initial system turn, on disk and in memory.
    pub fn reset(&self, session: &str) -> Result<Vec<ChatMessage>> {
        let history = self.initial_history();
        self.save(session, &history)?;
        Ok(history)
    }

    /// List known session names, derived from filenames.
    pub fn list_sessions(&self) -> Result<Vec<String>> {
        self.ensure_dir()?;

        let mut sessions = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    sessions.push(stem.to_string());
                }
            }
        }
        sessions.sort();
        Ok(sessions)
    }

    /// Delete a session file. Returns whether it existed.
    pub fn delete(&self, session: &str) -> Result<bool> {
        let path = self.session_path(session);
        if path.exists() {
            std::fs::remove_file(path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Store directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }
}

/// Parse a session file leniently: entries that are not well-formed chat
/// turns are skipped rather than failing the whole file. Fails only when
/// the file is not a JSON array at all.
fn parse_history(content: &str) -> std::result::Result<Vec<ChatMessage>, serde_json::Error> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(content)?;

    let mut history = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(role) = entry.get("role").and_then(|r| r.as_str()) else {
            continue;
        };
        let Some(content) = entry.get("content").and_then(|c| c.as_str()) else {
            continue;
        };
        let role = match role {
            "system" => Role::System,
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => continue,
        };
        history.push(ChatMessage {
            role,
            content: content.to_string(),
        });
    }
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;
    use tempfile::tempdir;

    const SYSTEM: &str = "You are a friendly personal assistant.";

    #[test]
    fn test_missing_file_creates_initial_history() {
        let dir = tempdir().unwrap();
        let store = ChatStore::new(dir.path(), SYSTEM);

        let history = store.load_or_create("default").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::System);
        assert!(store.session_path("default").exists());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = ChatStore::new(dir.path(), SYSTEM);

        let history = vec![
            ChatMessage::system(SYSTEM),
            ChatMessage::user("hello"),
            ChatMessage::assistant("hi there"),
            ChatMessage::user("how are you?"),
        ];
        store.save("work", &history).unwrap();

        let loaded = store.load_or_create("work").unwrap();
        assert_eq!(loaded, history);
    }

    #[test]
    fn test_corrupted_file_resets_without_error() {
        let dir = tempdir().unwrap();
        let store = ChatStore::new(dir.path(), SYSTEM);

        std::fs::create_dir_all(dir.path()).unwrap();
        std::fs::write(store.session_path("broken"), "{not json").unwrap();

        let history = store.load_or_create("broken").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::System);

        // The file was rewritten with the fresh history
        let reloaded = store.load_or_create("broken").unwrap();
        assert_eq!(reloaded, history);
    }

    #[test]
    fn test_unknown_role_entries_are_skipped() {
        let dir = tempdir().unwrap();
        let store = ChatStore::new(dir.path(), SYSTEM);

        std::fs::write(
            store.session_path("mixed"),
            r#"[
                {"role": "system", "content": "be brief"},
                {"role": "tool", "content": "tool output"},
                {"role": "user", "content": "keep me"}
            ]"#,
        )
        .unwrap();

        let history = store.load_or_create("mixed").unwrap();
        assert_eq!(
            history,
            vec![ChatMessage::system("be brief"), ChatMessage::user("keep me")]
        );
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let dir = tempdir().unwrap();
        let store = ChatStore::new(dir.path(), SYSTEM);

        std::fs::write(
            store.session_path("ragged"),
            r#"[42, {"role": "user"}, {"content": "no role"}, {"role": "assistant", "content": "still here"}]"#,
        )
        .unwrap();

        let history = store.load_or_create("ragged").unwrap();
        assert_eq!(history, vec![ChatMessage::assistant("still here")]);
    }

    #[test]
    fn test_empty_array_falls_back_to_initial_history() {
        let dir = tempdir().unwrap();
        let store = ChatStore::new(dir.path(), SYSTEM);

        std::fs::write(store.session_path("empty"), "[]").unwrap();
        let history = store.load_or_create("empty").unwrap();
        assert_eq!(history, store.initial_history());
    }

    #[test]
    fn test_list_and_delete_sessions() {
        let dir = tempdir().unwrap();
        let store = ChatStore::new(dir.path(), SYSTEM);

        store.load_or_create("alpha").unwrap();
        store.load_or_create("beta").unwrap();
        assert_eq!(store.list_sessions().unwrap(), vec!["alpha", "beta"]);

        assert!(store.delete("alpha").unwrap());
        assert!(!store.delete("alpha").unwrap());
        assert_eq!(store.list_sessions().unwrap(), vec!["beta"]);
    }

    #[test]
    fn test_reset_keeps_only_system_turn() {
        let dir = tempdir().unwrap();
        let store = ChatStore::new(dir.path(), SYSTEM);

        store
            .save(
                "chatty",
                &[
                    ChatMessage::system(SYSTEM),
                    ChatMessage::user("hi"),
                    ChatMessage::assistant("hello"),
                ],
            )
            .unwrap();

        let history = store.reset("chatty").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(store.load_or_create("chatty").unwrap().len(), 1);
    }

    #[test]
    fn test_session_names_with_spaces() {
        let dir = tempdir().unwrap();
        let store = ChatStore::new(dir.path(), SYSTEM);

        store.load_or_create("my notes").unwrap();
        assert!(dir.path().join("my_notes.json").exists());
    }
}
