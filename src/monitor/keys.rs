//! Key presses and text typing.

use tracing::trace;

use crate::error::{Error, Result};
use crate::protocol::{Command, KeyValue};

use super::Monitor;
use super::keyboard::{KeyChord, chord_for};

// ============================================================================
// Monitor - Keyboard Input
// ============================================================================

impl Monitor {
    /// Presses raw key descriptors as one stroke.
    ///
    /// All keys go down together and release when the monitor
    /// completes the command.
    pub async fn send_keys(&self, keys: Vec<KeyValue>) -> Result<()> {
        self.inner.connection.execute(Command::send_key(keys)).await?;
        Ok(())
    }

    /// Presses a chord, e.g. `ctrl-f2` to focus the menu bar on a
    /// macOS guest.
    pub async fn press(&self, chord: &KeyChord) -> Result<()> {
        trace!(chord = %chord, "pressing");
        self.send_keys(chord.descriptors()).await
    }

    /// Types text character by character.
    ///
    /// Each character becomes one key stroke; newlines press return,
    /// so multi-line input doubles as submitting commands to a guest
    /// shell.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] on the first character with no
    /// key mapping. Characters before it have already been typed.
    pub async fn type_text(&self, text: &str) -> Result<()> {
        for character in text.chars() {
            let chord = chord_for(character).ok_or_else(|| Error::invalid_key(character))?;
            self.press(&chord).await?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
