//! Explicit user confirmation before destructive actions.

use std::io::{BufRead, Write};

/// Asks the user to confirm a mutating action. Declining aborts it before
/// any request is sent.
pub trait Confirm: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Answers yes without asking (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, message: &str) -> bool {
        tracing::debug!(message, "auto-confirmed");
        true
    }
}

/// Prompts on stderr and reads one line from stdin; only `y`/`yes` confirm.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, message: &str) -> bool {
        let mut stderr = std::io::stderr();
        if write!(stderr, "{message} [y/N] ").and_then(|_| stderr.flush()).is_err() {
            return false;
        }

        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
