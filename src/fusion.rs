//! Prompt assembly from recalled turns and the current message.

use crate::memory::Turn;

/// Build the outbound prompt: one `"<author>: <content>"` line per recalled turn in the
/// order given, a blank line, then `"User: <current_message>"`.
///
/// With no recall the result is `"\n\nUser: <current_message>"`.
pub fn fuse(recall_results: &[Turn], current_message: &str) -> String {
    let recalled = recall_results
        .iter()
        .map(|turn| format!("{}: {}", turn.author, turn.content))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{recalled}\n\nUser: {current_message}")
}
