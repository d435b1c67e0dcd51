//! Async line input for the terminal chat.
//!
//! Thin wrapper over `rustyline_async` that folds EOF (Ctrl+D) and
//! interrupt (Ctrl+C) into end-of-input -- the chat loop treats both as
//! "leave".

use rustyline_async::{Readline, ReadlineError, ReadlineEvent, SharedWriter};

/// Async line reader for the chat prompt.
pub struct LineReader {
    rl: Readline,
}

impl LineReader {
    /// Create a reader with the given prompt.
    ///
    /// Also returns a `SharedWriter` for printing output without
    /// clobbering the prompt line.
    pub fn new(prompt: String) -> Result<(Self, SharedWriter), ReadlineError> {
        let (rl, stdout) = Readline::new(prompt)?;
        Ok((Self { rl }, stdout))
    }

    /// Read the next trimmed line, or `None` when the user is done
    /// (Ctrl+D, Ctrl+C, or a closed terminal).
    pub async fn next_line(&mut self) -> Option<String> {
        match self.rl.readline().await {
            Ok(ReadlineEvent::Line(line)) => Some(line.trim().to_string()),
            Ok(ReadlineEvent::Eof | ReadlineEvent::Interrupted) | Err(_) => None,
        }
    }
}
