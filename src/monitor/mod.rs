//! Guest automation over a monitor connection.
//!
//! Each [`Monitor`] wraps one live connection and exposes the
//! operations installer workflows are written in: pressing keys,
//! typing text, capturing the display and waiting for text to show up
//! on it.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | Monitor struct, accessors, raw command execution |
//! | `keyboard` | Character to key-chord translation |
//! | `keys` | Key presses and text typing |
//! | `screen` | Screen capture and text waits |
//!
//! # Example
//!
//! ```ignore
//! let monitor = driver.connect().await?;
//! monitor.negotiate_capabilities().await?;
//!
//! // Wait for the installer to draw its first screen
//! monitor.wait_for_text("boot menu", "macOS Utilities", Wait::seconds(300)).await?;
//!
//! // Drive it by keyboard
//! monitor.press(&KeyChord::parse("ctrl-f2")).await?;
//! monitor.type_text("u\nt\n").await?;
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod core;
mod keyboard;
mod keys;
mod screen;

// ============================================================================
// Re-exports
// ============================================================================

pub use core::Monitor;
pub use keyboard::{KeyChord, chord_for};
