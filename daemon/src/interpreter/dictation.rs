//! Message dictation
//!
//! Lossy keyword stripping: command words are dropped, the rest is kept
//! verbatim with its first character capitalized.

/// Words removed from a dictation transcript
const COMMAND_WORDS: &[&str] = &["dictate", "message", "write", "type", "send"];

/// Extract the message body, or `None` if only command words were spoken
pub fn extract_message(transcript: &str) -> Option<String> {
    let body = transcript
        .split_whitespace()
        .filter(|word| !COMMAND_WORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ");

    let mut chars = body.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}
