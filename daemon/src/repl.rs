//! Stdin repl
//!
//! Each stdin line is a final transcript. Page actions are printed to stdout
//! as JSON lines; timers run for real, so a self-destruct counts down live.
//! Closing stdin mid-countdown keeps the repl alive until the countdown ends.

use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tracing::info;

use crate::assistant::{Assistant, Input};
use crate::config::AssistantConfig;
use crate::events::PageAction;
use crate::state::CountdownState;
use crate::timers::TimerDriver;

/// Run until stdin closes with no countdown left, or the session is closed
pub async fn run(config: AssistantConfig) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    drive(config, stdin, std::io::stdout()).await
}

async fn drive<R, W>(config: AssistantConfig, reader: R, mut out: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    // Actions are printed straight from `handle`, nothing subscribes
    let (action_tx, _) = broadcast::channel::<PageAction>(16);
    let (tick_tx, mut tick_rx) = mpsc::channel(64);

    let mut assistant = Assistant::new(config, action_tx);
    let mut timers = TimerDriver::new(tick_tx);
    let mut lines = reader.lines();
    let mut stdin_open = true;

    info!("repl ready, one transcript per line");

    loop {
        let counting = matches!(assistant.countdown_state(), CountdownState::Counting { .. });
        if !stdin_open && !counting {
            break;
        }

        let input = tokio::select! {
            line = lines.next_line(), if stdin_open => {
                match line.context("failed to read stdin")? {
                    Some(line) if line.trim().is_empty() => continue,
                    Some(line) => Input::Transcript(line),
                    None => {
                        info!(counting, "stdin closed");
                        stdin_open = false;
                        continue;
                    }
                }
            }
            Some(tick) = tick_rx.recv() => tick,
            else => break,
        };

        for action in assistant.handle(input) {
            timers.apply(&action);
            writeln!(out, "{}", serde_json::to_string(&action)?)?;
            if action == PageAction::CloseSession {
                out.flush()?;
                info!("session closed");
                return Ok(());
            }
        }
        out.flush()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ScrollTarget;

    async fn printed(input: &str) -> Vec<PageAction> {
        let mut out = Vec::new();
        drive(AssistantConfig::default(), input.as_bytes(), &mut out)
            .await
            .unwrap();

        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_piped_self_destruct_counts_down() {
        let actions = printed("go home\nself destruct\n").await;

        assert!(actions.contains(&PageAction::ScrollTo {
            target: ScrollTarget::Top
        }));
        assert!(actions.contains(&PageAction::ShowCountdown { remaining: 1 }));
        assert_eq!(actions.last(), Some(&PageAction::CloseSession));
    }

    #[tokio::test(start_paused = true)]
    async fn test_eof_without_countdown_exits() {
        let actions = printed("combat mode\n\ntake off\n").await;

        assert_eq!(actions[0], PageAction::speak("Combat mode engaged."));
        assert!(!actions.contains(&PageAction::CloseSession));
        assert!(!actions
            .iter()
            .any(|a| matches!(a, PageAction::FlightTelemetry { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_override_before_eof() {
        let actions = printed("self destruct\noverride alpha\n").await;

        assert!(actions.contains(&PageAction::HideCountdown));
        assert!(!actions.contains(&PageAction::CloseSession));
    }
}
