//! Error types for the QEMU autopilot.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use qemu_autopilot::{Result, Error};
//!
//! async fn example(monitor: &Monitor) -> Result<()> {
//!     monitor.negotiate_capabilities().await?;
//!     monitor.type_text("hello\n").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`] |
//! | Protocol | [`Error::MalformedMessage`], [`Error::ProtocolViolation`], [`Error::FrameTooLarge`], [`Error::CommandFailed`] |
//! | Input | [`Error::InvalidKey`] |
//! | Execution | [`Error::WaitTimeout`], [`Error::Ocr`] |
//! | External | [`Error::Io`], [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;
use std::time::Duration;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when driver configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Monitor socket connection failed.
    ///
    /// Returned when the socket cannot be reached or the transport
    /// breaks while commands are in flight.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Connection deliberately closed.
    ///
    /// Returned to requests still pending when the client shuts the
    /// connection down.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Incoming frame was not valid JSON (or not valid UTF-8).
    ///
    /// The monitor speaks line-delimited JSON; a frame that cannot be
    /// parsed means the byte stream itself can no longer be trusted, so
    /// this error terminates the connection.
    #[error("Malformed message: {detail}: {frame}")]
    MalformedMessage {
        /// Why the frame could not be parsed.
        detail: String,
        /// The offending frame text (lossily decoded if needed).
        frame: String,
    },

    /// Reply arrived with no command awaiting it.
    ///
    /// Replies carry no identifiers, so an unsolicited reply means the
    /// pairing between commands and replies is lost for good.
    #[error("Protocol violation: {message}")]
    ProtocolViolation {
        /// Description of the violation.
        message: String,
    },

    /// A single frame exceeded the configured size limit.
    ///
    /// Protects against an endless line from a misbehaving peer.
    #[error("Frame of {length} bytes exceeds the {limit} byte limit")]
    FrameTooLarge {
        /// The configured per-frame limit in bytes.
        limit: usize,
        /// Observed frame length when the limit was hit.
        length: usize,
    },

    /// The monitor rejected a command.
    ///
    /// Returned when a reply carries an error payload instead of a
    /// result.
    #[error("Command failed: {class}: {desc}")]
    CommandFailed {
        /// QMP error class, e.g. `GenericError`.
        class: String,
        /// Human-readable description from the monitor.
        desc: String,
    },

    // ========================================================================
    // Input Errors
    // ========================================================================
    /// No key-code mapping exists for a character.
    ///
    /// Returned when text to type contains a character outside the
    /// supported US-layout set.
    #[error("No key mapping for character {character:?}")]
    InvalidKey {
        /// The unmappable character.
        character: char,
    },

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// A bounded wait ran out of attempts.
    ///
    /// Returned when a polled condition never became true.
    #[error("Timed out waiting for {condition} after {attempts} attempts ({waited_ms}ms)")]
    WaitTimeout {
        /// Description of the condition waited for.
        condition: String,
        /// Number of probe attempts made.
        attempts: u32,
        /// Milliseconds elapsed across all attempts.
        waited_ms: u64,
    },

    /// Text recognition failed.
    ///
    /// Returned when the external OCR process cannot be launched or
    /// exits unsuccessfully.
    #[error("OCR failed: {message}")]
    Ocr {
        /// Description of the recognition failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a malformed message error.
    #[inline]
    pub fn malformed(detail: impl Into<String>, frame: impl Into<String>) -> Self {
        Self::MalformedMessage {
            detail: detail.into(),
            frame: frame.into(),
        }
    }

    /// Creates a protocol violation error.
    #[inline]
    pub fn protocol_violation(message: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            message: message.into(),
        }
    }

    /// Creates a frame too large error.
    #[inline]
    pub fn frame_too_large(limit: usize, length: usize) -> Self {
        Self::FrameTooLarge { limit, length }
    }

    /// Creates a command failed error from a monitor error payload.
    #[inline]
    pub fn command_failed(class: impl Into<String>, desc: impl Into<String>) -> Self {
        Self::CommandFailed {
            class: class.into(),
            desc: desc.into(),
        }
    }

    /// Creates an invalid key error.
    #[inline]
    pub fn invalid_key(character: char) -> Self {
        Self::InvalidKey { character }
    }

    /// Creates a wait timeout error.
    #[inline]
    pub fn wait_timeout(condition: impl Into<String>, attempts: u32, waited: Duration) -> Self {
        Self::WaitTimeout {
            condition: condition.into(),
            attempts,
            waited_ms: waited.as_millis() as u64,
        }
    }

    /// Creates an OCR error.
    #[inline]
    pub fn ocr(message: impl Into<String>) -> Self {
        Self::Ocr {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::WaitTimeout { .. })
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionClosed | Self::Io(_)
        )
    }

    /// Returns `true` if the error invalidates the connection.
    ///
    /// After a fatal error the command/reply pairing can no longer be
    /// trusted and the connection must be torn down.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MalformedMessage { .. } | Self::ProtocolViolation { .. } | Self::FrameTooLarge { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
