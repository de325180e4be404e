//! Text recognition over guest screen captures.
//!
//! Reading the guest display is the only way to observe an installer
//! that exposes no other channel. Recognition is a capability behind
//! [`TextRecognizer`] so the screen-text operations stay testable
//! without a real OCR engine; the production implementation shells out
//! to `tesseract`.
//!
//! # Invocation
//!
//! [`Tesseract`] runs the engine in sparse-text mode and reads the
//! recognized text from stdout:
//!
//! ```text
//! tesseract <image> - --psm 11 --dpi 72 -l eng
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::error::{Error, Result};

// ============================================================================
// TextRecognizer
// ============================================================================

/// Capability to turn a screen capture into text.
///
/// Implementations are free to be as crude as the screen content
/// allows; callers only ever substring-match the result.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Extracts whatever text is legible in `image`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Ocr`] when recognition cannot run or fails.
    async fn recognize(&self, image: &Path) -> Result<String>;
}

// ============================================================================
// Tesseract
// ============================================================================

/// [`TextRecognizer`] backed by the `tesseract` command-line engine.
///
/// Page segmentation mode 11 ("sparse text") suits installer screens,
/// which scatter short labels over a mostly empty display.
#[derive(Debug, Clone)]
pub struct Tesseract {
    /// Engine binary, resolved through `PATH` by default.
    binary: PathBuf,
    /// Recognition language passed as `-l`.
    language: String,
    /// Page segmentation mode passed as `--psm`.
    page_segmentation: u8,
    /// Source resolution hint passed as `--dpi`.
    dpi: u32,
}

impl Default for Tesseract {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            language: "eng".to_owned(),
            page_segmentation: 11,
            dpi: 72,
        }
    }
}

impl Tesseract {
    /// Creates the default engine configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the engine binary path.
    #[must_use]
    pub fn binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Sets the recognition language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets the page segmentation mode.
    #[must_use]
    pub fn page_segmentation(mut self, mode: u8) -> Self {
        self.page_segmentation = mode;
        self
    }

    /// Sets the source resolution hint.
    #[must_use]
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Builds the argument list for one invocation.
    ///
    /// `-` as the output base sends recognized text to stdout.
    fn invocation_args(&self, image: &Path) -> Vec<OsString> {
        vec![
            image.as_os_str().to_owned(),
            OsString::from("-"),
            OsString::from("--psm"),
            OsString::from(self.page_segmentation.to_string()),
            OsString::from("--dpi"),
            OsString::from(self.dpi.to_string()),
            OsString::from("-l"),
            OsString::from(self.language.as_str()),
        ]
    }
}

#[async_trait]
impl TextRecognizer for Tesseract {
    async fn recognize(&self, image: &Path) -> Result<String> {
        trace!(image = %image.display(), "running tesseract");

        let output = Command::new(&self.binary)
            .args(self.invocation_args(image))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|err| {
                Error::ocr(format!(
                    "failed to launch {}: {err}",
                    self.binary.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ocr(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(
            image = %image.display(),
            bytes = text.len(),
            "recognition complete"
        );
        Ok(text)
    }
}

// ============================================================================
// Tests
// ============================================================================
