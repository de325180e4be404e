//! Monitor protocol message types.
//!
//! This module defines the wire vocabulary spoken over the monitor
//! socket: line-delimited JSON in both directions.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | [`Command`] | Client → Monitor | Command execution request |
//! | [`Reply`] | Monitor → Client | Answer to the oldest pending command |
//! | [`Event`] | Monitor → Client | Asynchronous notification |
//!
//! Neither direction carries request identifiers; replies are paired
//! with commands purely by arrival order. The transport layer owns
//! that pairing, this module only names the shapes.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Outgoing command definitions |
//! | `message` | Incoming message parsing and classification |

// ============================================================================
// Submodules
// ============================================================================

/// Outgoing command definitions.
pub mod command;

/// Incoming message parsing and classification.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{Command, KeyValue, MonitorCommand, RawCommand};
pub use message::{Event, Message, Reply};
