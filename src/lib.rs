//! QEMU autopilot - unattended guest installs driven over QMP.
//!
//! This library drives a guest OS through its installer by talking to
//! the QEMU monitor: it types on the virtual keyboard, captures the
//! guest display, and recognizes on-screen text to decide when the
//! next step is ready.
//!
//! # Architecture
//!
//! The crate is built around one fact of the monitor protocol: the
//! wire carries no request identifiers, so replies pair with commands
//! purely by order.
//!
//! - **Transport**: one event-loop task per connection owns the
//!   socket, decodes newline-delimited JSON frames and completes the
//!   oldest pending command per reply
//! - **Monitor**: keyboard, capture and screen-wait operations on top
//!   of the transport
//! - **Waits**: progress is observed on the guest screen itself via
//!   OCR, since an installer exposes no other channel
//!
//! # Quick Start
//!
//! ```no_run
//! use qemu_autopilot::{Driver, Result, Wait};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Point the driver at the QMP socket QEMU was started with
//!     let driver = Driver::builder()
//!         .socket("/tmp/qmp.sock")
//!         .build()?;
//!
//!     let monitor = driver.connect().await?;
//!     monitor.negotiate_capabilities().await?;
//!
//!     // Give the installer five minutes to draw its first screen
//!     monitor
//!         .wait_for_text("installer boot", "macOS Utilities", Wait::seconds(300))
//!         .await?;
//!
//!     // Drive it by keyboard
//!     monitor.type_text("u\nt\n").await?;
//!
//!     monitor.close();
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`driver`] | Driver factory and configuration |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`monitor`] | Guest operations: [`Monitor`], [`KeyChord`] |
//! | [`ocr`] | Screen text recognition |
//! | [`protocol`] | Monitor message types (internal) |
//! | [`transport`] | Socket transport layer (internal) |
//! | [`wait`] | Bounded condition polling |

// ============================================================================
// Modules
// ============================================================================

/// Driver factory and configuration.
///
/// Use [`Driver::builder()`] to create a configured driver instance.
pub mod driver;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Guest automation over a monitor connection.
///
/// This module contains the operations installer workflows are
/// written in:
///
/// - [`Monitor`] - Connected monitor handle
/// - [`KeyChord`] - Keys pressed together as one stroke
pub mod monitor;

/// Screen text recognition.
///
/// The [`TextRecognizer`] capability and its `tesseract`-backed
/// implementation.
pub mod ocr;

/// Monitor protocol message types.
///
/// Internal module defining command/reply/event structures.
pub mod protocol;

/// Socket transport layer.
///
/// Internal module handling frame decoding, correlation and the
/// connection event loop.
pub mod transport;

/// Bounded condition polling.
///
/// [`Wait`] policies for probing a condition until it holds.
pub mod wait;

// ============================================================================
// Re-exports
// ============================================================================

// Monitor types
pub use monitor::{KeyChord, Monitor, chord_for};

// Driver types
pub use driver::{Driver, DriverBuilder, SOCKET_PATH_ENV};

// Error types
pub use error::{Error, Result};

// Recognition types
pub use ocr::{Tesseract, TextRecognizer};

// Protocol types
pub use protocol::{Command, Event, KeyValue, Message, Reply};

// Transport types
pub use transport::Connection;

// Wait types
pub use wait::Wait;
