//! Builder pattern for driver configuration.
//!
//! Provides a fluent API for configuring and creating [`Driver`] instances.
//!
//! # Example
//!
//! ```no_run
//! use qemu_autopilot::Driver;
//!
//! # fn example() -> qemu_autopilot::Result<()> {
//! let driver = Driver::builder()
//!     .socket("/tmp/qmp.sock")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use crate::error::{Error, Result};
use crate::ocr::{Tesseract, TextRecognizer};
use crate::transport::DEFAULT_MAX_FRAME_LEN;

use super::core::Driver;

// ============================================================================
// Constants
// ============================================================================

/// File name for captures when no explicit path is configured.
const DEFAULT_CAPTURE_NAME: &str = "screen.ppm";

// ============================================================================
// DriverBuilder
// ============================================================================

/// Builder for configuring a [`Driver`] instance.
///
/// Use [`Driver::builder()`] to create a new builder.
#[derive(Clone)]
pub struct DriverBuilder {
    /// Path to the monitor socket.
    socket: Option<PathBuf>,
    /// Capture path override.
    screenshot_path: Option<PathBuf>,
    /// Recognizer override.
    recognizer: Option<Arc<dyn TextRecognizer>>,
    /// Per-frame size limit for the connection.
    max_frame_len: usize,
}

impl Default for DriverBuilder {
    fn default() -> Self {
        Self {
            socket: None,
            screenshot_path: None,
            recognizer: None,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

impl fmt::Debug for DriverBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverBuilder")
            .field("socket", &self.socket)
            .field("screenshot_path", &self.screenshot_path)
            .field("max_frame_len", &self.max_frame_len)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// DriverBuilder Implementation
// ============================================================================

impl DriverBuilder {
    /// Creates a new driver builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path to the monitor socket.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the Unix socket QEMU was started with
    ///   (e.g. `-qmp unix:/tmp/qmp.sock,server=on,wait=off`)
    #[inline]
    #[must_use]
    pub fn socket(mut self, path: impl Into<PathBuf>) -> Self {
        self.socket = Some(path.into());
        self
    }

    /// Sets the path screen captures are written to.
    ///
    /// Defaults to a file inside a temporary directory that lives as
    /// long as the driver and its monitors do. The path must be valid
    /// UTF-8 since it travels inside a JSON command.
    #[inline]
    #[must_use]
    pub fn screenshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.screenshot_path = Some(path.into());
        self
    }

    /// Sets the text recognizer used by screen waits.
    ///
    /// Defaults to [`Tesseract`] with its stock settings.
    #[inline]
    #[must_use]
    pub fn recognizer(mut self, recognizer: impl TextRecognizer + 'static) -> Self {
        self.recognizer = Some(Arc::new(recognizer));
        self
    }

    /// Sets the per-frame size limit for monitor connections.
    #[inline]
    #[must_use]
    pub fn max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    /// Builds the driver with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the socket path is not set
    /// - [`Error::Config`] if the capture path is not valid UTF-8, or
    ///   the default capture directory cannot be created
    pub fn build(self) -> Result<Driver> {
        let socket = self.validate_socket()?;
        let (screenshot_path, capture_dir) = self.validate_capture_path()?;
        let recognizer = self
            .recognizer
            .unwrap_or_else(|| Arc::new(Tesseract::new()));

        Ok(Driver::new(
            socket,
            screenshot_path,
            recognizer,
            capture_dir,
            self.max_frame_len,
        ))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl DriverBuilder {
    /// Validates the socket path configuration.
    fn validate_socket(&self) -> Result<PathBuf> {
        self.socket.clone().ok_or_else(|| {
            Error::config(
                "Monitor socket path is required. Use .socket() to set it.\n\
                 Example: Driver::builder().socket(\"/tmp/qmp.sock\")",
            )
        })
    }

    /// Resolves the capture path, creating a holding directory when
    /// none was configured.
    fn validate_capture_path(&self) -> Result<(PathBuf, Option<Arc<TempDir>>)> {
        if let Some(path) = self.screenshot_path.clone() {
            if path.to_str().is_none() {
                return Err(Error::config(format!(
                    "Screenshot path is not valid UTF-8: {}",
                    path.display()
                )));
            }
            return Ok((path, None));
        }

        let dir = TempDir::new().map_err(|err| {
            Error::config(format!("failed to create capture directory: {err}"))
        })?;
        let path = dir.path().join(DEFAULT_CAPTURE_NAME);
        Ok((path, Some(Arc::new(dir))))
    }
}

// ============================================================================
// Tests
// ============================================================================
