//! Interactive terminal chat.
//!
//! Runs a streaming conversation against a fresh session: read a line,
//! relay the fragments as they arrive, repeat. `quit`/`exit`, Ctrl+C,
//! or Ctrl+D leave the loop. History lives in the session store like
//! any other session and dies with the process.

use std::io::Write;

use console::style;
use futures_util::StreamExt;
use tracing::debug;
use uuid::Uuid;

use parley_types::persona::Persona;

use crate::state::AppState;

use super::input::LineReader;

/// Run the interactive chat loop.
pub async fn run_chat_loop(state: &AppState, persona: Persona) -> anyhow::Result<()> {
    let session_id = Uuid::now_v7().to_string();
    debug!(session_id = %session_id, "terminal chat session started");

    let prompt = format!("{} ", style("You:").bold().cyan());
    let (mut input, mut stdout) = LineReader::new(prompt)?;

    writeln!(
        stdout,
        "\n  Chatting with {} ({}). Type 'exit' to quit.\n",
        style(&persona.bot_name).magenta().bold(),
        style(&session_id).dim(),
    )?;

    while let Some(message) = input.next_line().await {
        if message.is_empty() {
            continue;
        }
        if message.eq_ignore_ascii_case("quit") || message.eq_ignore_ascii_case("exit") {
            break;
        }

        let stream = state
            .chat_service
            .stream_with_session(&session_id, &persona, &message)
            .await;

        let mut stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                writeln!(stdout, "{} {e}", style("error:").red().bold())?;
                continue;
            }
        };

        write!(
            stdout,
            "{} ",
            style(format!("{}:", persona.bot_name)).magenta().bold()
        )?;
        stdout.flush()?;

        while let Some(item) = stream.next().await {
            match item {
                Ok(fragment) => {
                    write!(stdout, "{fragment}")?;
                    stdout.flush()?;
                }
                Err(e) => {
                    writeln!(stdout, "\n{} {e}", style("error:").red().bold())?;
                    break;
                }
            }
        }
        writeln!(stdout, "\n")?;
    }

    writeln!(stdout, "{}", style("Bye!").dim())?;
    Ok(())
}
