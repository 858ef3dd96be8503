//! Interactive question-answering over one or more videos.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::{Result, TubechatError};
use crate::session::SessionCoordinator;
use crate::transcript::extract_video_id;
use console::style;
use std::io::{self, BufRead, Write};

/// Build a session over the given videos and start a question loop.
pub async fn run_video(inputs: &[String], model: Option<String>, mut settings: Settings) -> Result<()> {
    if let Some(model) = model {
        settings.rag.model = model;
    }

    let mut video_ids = Vec::new();
    for input in inputs {
        match extract_video_id(input) {
            Some(id) => video_ids.push(id),
            None => {
                return Err(TubechatError::InvalidInput(format!(
                    "Invalid YouTube URL or video ID: {}",
                    input
                )))
            }
        }
    }

    let mut coordinator = SessionCoordinator::new(&settings)?;

    let spinner = Output::spinner("Downloading transcripts and building the index...");
    let outcome = coordinator.initialize(&video_ids).await;
    spinner.finish_and_clear();

    let outcome = outcome?;

    for failure in &outcome.failed {
        Output::warning(&format!("{}: {}", failure.video_id, failure.error));
    }
    Output::success(&format!(
        "Ready! Loaded {} video(s): {}",
        outcome.video_ids.len(),
        outcome.video_ids.join(", ")
    ));
    println!(
        "{}\n",
        style("Ask anything about the loaded videos. Type 'exit' to quit.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let question = input.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        match coordinator.query(question).await {
            Ok(answer) => println!("\n{} {}\n", style("AI:").cyan().bold(), answer),
            Err(e) => Output::error(&format!("{}", e)),
        }
    }

    Ok(())
}
