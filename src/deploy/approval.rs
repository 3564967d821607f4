// ABOUTME: Interactive yes/no confirmation before risky deploy steps.
// ABOUTME: Refuses automatically when no terminal is attached or stacks deploy concurrently.

use async_trait::async_trait;
use std::io::{self, BufRead, IsTerminal, Write};

use super::DeployError;

/// Asks a human a yes/no question.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Whether someone can answer.
    fn is_interactive(&self) -> bool;

    async fn confirm(&self, question: &str) -> io::Result<bool>;
}

/// Prompts on stderr and reads the answer from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

#[async_trait]
impl Prompter for TerminalPrompter {
    fn is_interactive(&self) -> bool {
        io::stdin().is_terminal()
    }

    async fn confirm(&self, question: &str) -> io::Result<bool> {
        let question = question.to_string();
        tokio::task::spawn_blocking(move || {
            let mut stderr = io::stderr();
            write!(stderr, "{question} (y/n)? ")?;
            stderr.flush()?;

            let mut answer = String::new();
            io::stdin().lock().read_line(&mut answer)?;
            Ok(is_yes(&answer))
        })
        .await
        .map_err(io::Error::other)?
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Get an explicit yes from the user, or fail with `motivation` explaining why it was needed.
pub async fn ask_user_confirmation(
    prompter: &dyn Prompter,
    concurrency: usize,
    motivation: &str,
    question: &str,
) -> Result<(), DeployError> {
    if !prompter.is_interactive() {
        return Err(DeployError::NoTerminal {
            motivation: motivation.to_string(),
        });
    }

    if concurrency > 1 {
        return Err(DeployError::ConcurrencyTooHigh {
            motivation: motivation.to_string(),
        });
    }

    let confirmed = prompter
        .confirm(question)
        .await
        .map_err(DeployError::Prompt)?;
    if !confirmed {
        return Err(DeployError::Aborted);
    }

    Ok(())
}
