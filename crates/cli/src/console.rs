use async_trait::async_trait;
use log::warn;
use repolink_protocol::{serialize_json, FollowUp};
use repolink_resolver::ActionSink;
use std::io::{self, Write};

/// Prints messages and follow-up actions to the terminal. Follow-ups go to
/// stdout as one JSON object per line so other tools can pick them up.
#[derive(Debug, Default)]
pub struct ConsoleSink;

#[async_trait]
impl ActionSink for ConsoleSink {
    async fn show_info(&self, text: &str) {
        print_stdout(text);
    }

    async fn show_error(&self, text: &str) {
        eprintln!("{text}");
    }

    async fn invoke_follow_up(&self, follow_up: FollowUp) {
        match serialize_json(&follow_up) {
            Ok(line) => print_stdout(&line),
            Err(err) => warn!("failed to encode {} follow-up: {err}", follow_up.kind()),
        }
    }
}

pub fn print_stdout(text: &str) {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.write_all(b"\n"))
        .and_then(|()| stdout.flush())
    {
        if err.kind() != io::ErrorKind::BrokenPipe {
            warn!("failed to write to stdout: {err}");
        }
    }
}
