use serde::Deserialize;
use thiserror::Error;

/// One observed keystroke reported by the client.
///
/// `key` holds the produced character; it is absent when the client reports
/// a plain space. Multi-character values are key *names* ("Shift",
/// "Backspace") rather than characters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeyEvent {
    pub ts: i64,
    pub key: Option<String>,
}

impl KeyEvent {
    pub fn new(ts: i64, key: Option<&str>) -> Self {
        Self {
            ts,
            key: key.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ReconcileError {
    /// The event stream ran out before every sentence character was matched.
    #[error("event stream ended before the sentence was covered")]
    IncompleteInput,
}

/// Aligns an ordered event stream against the characters of `text` and
/// returns how many keystrokes missed their expected character.
///
/// Two cursors scan left to right and never move backwards. A key name
/// longer than one character is a control key and consumes only the event;
/// a matching key advances both cursors; anything else counts as an error
/// and leaves the expected character in place for a retry. Events left over
/// after the last character are ignored.
pub fn reconcile(text: &str, events: &[KeyEvent]) -> Result<usize, ReconcileError> {
    let chars: Vec<char> = text.chars().collect();

    let mut errors = 0;
    let mut char_index = 0;
    let mut event_index = 0;

    while char_index < chars.len() {
        let Some(event) = events.get(event_index) else {
            return Err(ReconcileError::IncompleteInput);
        };

        let key = event.key.as_deref().unwrap_or(" ");

        // Control keys are not character attempts.
        if key.chars().count() > 1 {
            event_index += 1;
            continue;
        }

        if key.chars().next() == Some(chars[char_index]) {
            char_index += 1;
            event_index += 1;
        } else {
            errors += 1;
            event_index += 1;
        }
    }

    Ok(errors)
}
