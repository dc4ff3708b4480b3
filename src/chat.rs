//! Interactive room session on the terminal.
//!
//! Typed lines are posted as the configured identity. A subscription prints
//! every message that lands in the room, including the assistant's.

use crate::gateway::{AskOutcome, Gateway};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use wheredunno_core::{
    message::{ChatMessage, Identity},
    traits::MessageChannel,
};

/// Messages shown from the backlog when the session opens.
const BACKLOG: usize = 20;

const HELP: &str = "Commands:\n  \
    /ask <question>      ask the AI assistant\n  \
    /analyze <question>  ask about the recent conversation\n  \
    /quit                leave the room\n\
    Anything else is sent to the room.";

/// One line of terminal input.
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    Blank,
    Message(&'a str),
    Ask(&'a str),
    Analyze(&'a str),
    Quit,
    Help,
}

/// Classify a typed line. Unknown slash commands show help.
pub fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Input::Blank;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Message(line);
    };
    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map(|(n, r)| (n, r.trim()))
        .unwrap_or((command, ""));
    match name.to_lowercase().as_str() {
        "ask" if !rest.is_empty() => Input::Ask(rest),
        "analyze" if !rest.is_empty() => Input::Analyze(rest),
        "quit" | "exit" => Input::Quit,
        _ => Input::Help,
    }
}

/// `[HH:MM] name: text`
pub fn render_line(message: &ChatMessage) -> String {
    format!(
        "[{}] {}: {}",
        message.time_label(),
        message.user_name,
        message.text
    )
}

/// Print room messages not yet shown, until cancelled or the stream ends.
async fn render_room(room: Arc<dyn MessageChannel>, cancel: CancellationToken) {
    let mut stream = match room.subscribe().await {
        Ok(stream) => stream,
        Err(e) => {
            warn!("chat: subscribe failed: {e}");
            return;
        }
    };

    let mut shown: HashSet<String> = HashSet::new();
    let mut first = true;
    loop {
        let snapshot = tokio::select! {
            _ = cancel.cancelled() => break,
            next = stream.next() => match next {
                Some(snapshot) => snapshot,
                None => break,
            },
        };

        let skip = if first {
            snapshot.len().saturating_sub(BACKLOG)
        } else {
            0
        };
        first = false;

        for (i, message) in snapshot.iter().enumerate() {
            if !shown.insert(message.id.clone()) || i < skip {
                continue;
            }
            println!("{}", render_line(message));
        }
    }
    debug!("chat: renderer stopped");
}

/// Run the session until `/quit`, end of input, or Ctrl-C.
pub async fn run(
    gateway: Arc<Gateway>,
    room: Arc<dyn MessageChannel>,
    identity: Identity,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    println!("Joined as {}. Type /help for commands.", identity.user_name);
    let renderer = tokio::spawn(render_room(room, cancel.clone()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = cancel.cancelled() => break,
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
        };

        match parse_input(&line) {
            Input::Blank => {}
            Input::Quit => break,
            Input::Help => println!("{HELP}"),
            Input::Message(text) => {
                if let Err(e) = gateway.send_message(&identity, text).await {
                    eprintln!("{e}");
                }
            }
            Input::Ask(question) => {
                if let Some(AskOutcome::Failed { notice, .. }) = gateway.ask(question).await {
                    eprintln!("{notice}");
                }
            }
            Input::Analyze(question) => match gateway.analyze(question).await {
                Ok(answer) => println!("AI: {answer}"),
                Err(e) => eprintln!("Analysis failed: {e}"),
            },
        }
    }

    cancel.cancel();
    if let Err(e) = renderer.await {
        warn!("chat: renderer ended abnormally: {e}");
    }
    Ok(())
}
