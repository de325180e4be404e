//! Screen capture and text waits.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::protocol::Command;
use crate::wait::Wait;

use super::Monitor;

// ============================================================================
// Monitor - Screen
// ============================================================================

impl Monitor {
    /// Captures the guest display.
    ///
    /// The monitor writes the image to the configured capture path on
    /// the host; successive captures overwrite it. Returns the path.
    pub async fn screenshot(&self) -> Result<PathBuf> {
        let path = &self.inner.screenshot_path;
        let filename = path.to_str().ok_or_else(|| {
            Error::config(format!(
                "screenshot path is not valid UTF-8: {}",
                path.display()
            ))
        })?;

        trace!(path = %path.display(), "capturing guest display");
        self.inner
            .connection
            .execute(Command::screendump(filename))
            .await?;
        Ok(path.clone())
    }

    /// Captures the display once and reports whether `needle` is
    /// legible on it.
    ///
    /// Recognition is best-effort; a clean capture of a screen that
    /// simply does not show the text yet returns `Ok(false)`.
    pub async fn sees_text(&self, needle: &str) -> Result<bool> {
        let capture = self.screenshot().await?;
        let text = self.inner.recognizer.recognize(&capture).await?;
        let seen = text.contains(needle);
        debug!(needle, seen, "screen text probe");
        Ok(seen)
    }

    /// Waits until `needle` shows up on the guest display.
    ///
    /// Probes the screen on the given policy; `what` names the screen
    /// being waited for in logs and errors.
    ///
    /// # Errors
    ///
    /// - [`Error::WaitTimeout`] if the text never appeared
    /// - Capture or recognition errors, unchanged and unretried
    pub async fn wait_for_text(&self, what: &str, needle: &str, wait: Wait) -> Result<()> {
        wait.until(what, || self.sees_text(needle)).await
    }
}

// ============================================================================
// Tests
// ============================================================================
