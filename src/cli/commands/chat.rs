//! Persistent multi-session chat command.

use crate::chat_store::ChatStore;
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::llm::{ChatMessage, ChatModel, OpenAIChatModel};
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive multi-session chat.
pub async fn run_chat(
    session: Option<String>,
    model: Option<String>,
    settings: Settings,
) -> Result<()> {
    let prompts = Prompts::default();
    let store = ChatStore::new(settings.sessions_dir(), &prompts.chat.system);
    let model_name = model.unwrap_or_else(|| settings.chat.model.clone());
    let model = OpenAIChatModel::new(&model_name)?;

    let mut current_session = session.unwrap_or_else(|| settings.chat.default_session.clone());
    let mut history = store.load_or_create(&current_session)?;

    println!("\n{}", style("Tubechat Personal Chat").bold().cyan());
    print_help();
    println!("Current session: {}\n", style(&current_session).bold());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style(format!("[{}] You:", current_session)).green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let stripped = input.trim();
        let command = stripped.to_lowercase();

        if stripped.is_empty() {
            continue;
        }

        if command == "exit" || command == "quit" {
            Output::info("Goodbye!");
            break;
        }

        if command == "help" {
            print_help();
            continue;
        }

        if command == "reset" {
            history = store.reset(&current_session)?;
            Output::info(&format!("Session '{}' has been reset.", current_session));
            continue;
        }

        if command == "list" {
            let sessions = store.list_sessions()?;
            if sessions.is_empty() {
                println!("No sessions found.\n");
            } else {
                println!("Sessions:");
                for name in sessions {
                    let marker = if name == current_session { "-> " } else { "   " };
                    println!("{}{}", marker, name);
                }
                println!();
            }
            continue;
        }

        if command.starts_with("new ") {
            let name = stripped[4..].trim();
            if name.is_empty() {
                println!("Please provide a session name. Example: new work\n");
                continue;
            }
            current_session = name.to_string();
            history = store.reset(&current_session)?;
            Output::info(&format!("Created and switched to new session: {}", current_session));
            continue;
        }

        if command.starts_with("switch ") {
            let name = stripped[7..].trim();
            if name.is_empty() {
                println!("Please provide a session name. Example: switch work\n");
                continue;
            }
            current_session = name.to_string();
            history = store.load_or_create(&current_session)?;
            Output::info(&format!("Switched to session: {}", current_session));
            continue;
        }

        if command.starts_with("delete ") {
            let name = stripped[7..].trim();
            if name.is_empty() {
                println!("Please provide a session name. Example: delete work\n");
                continue;
            }

            if !store.delete(name)? {
                println!("Session '{}' does not exist.\n", name);
                continue;
            }

            if name == current_session {
                Output::info(&format!(
                    "Deleted current session '{}'. Switching back to '{}'.",
                    name, settings.chat.default_session
                ));
                current_session = settings.chat.default_session.clone();
                history = store.load_or_create(&current_session)?;
            } else {
                Output::info(&format!("Deleted session '{}'.", name));
            }
            continue;
        }

        // Normal chat message: append, complete over the full history, persist
        history.push(ChatMessage::user(stripped));

        match model.complete(&history).await {
            Ok(answer) => {
                println!("\n{} {}\n", style("Assistant:").cyan().bold(), answer);
                history.push(ChatMessage::assistant(answer));
                store.save(&current_session, &history)?;
            }
            Err(e) => {
                // Drop the unanswered turn so the history stays consistent
                history.pop();
                Output::error(&format!("{}", e));
            }
        }
    }

    Ok(())
}

fn print_help() {
    println!("\nCommands:");
    println!("  exit / quit          - exit the program");
    println!("  reset                - reset current session history");
    println!("  list                 - list all sessions");
    println!("  new <name>           - create a new session and switch to it");
    println!("  switch <name>        - switch to an existing session (or create if missing)");
    println!("  delete <name>        - delete a session");
    println!("  help                 - show this help message\n");
}
