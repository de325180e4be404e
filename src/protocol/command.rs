//! Outgoing monitor command definitions.
//!
//! Every command serializes to a single-line JSON object with an
//! `execute` field naming the command and an optional `arguments`
//! object:
//!
//! ```json
//! {"execute": "send-key", "arguments": {"keys": [{"type": "qcode", "data": "ret"}]}}
//! ```
//!
//! # Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `qmp_capabilities` | Leave greeting mode, enable command execution |
//! | `send-key` | Press a chord of keys in the guest |
//! | `screendump` | Write a screenshot of the guest display to a file |
//! | anything else | Raw escape hatch via [`RawCommand`] |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Command Wrapper
// ============================================================================

/// All monitor commands under one serializable type.
///
/// This enum wraps the typed command set and the raw escape hatch for
/// unified serialization.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Command {
    /// Typed commands the crate issues itself.
    Monitor(MonitorCommand),
    /// Free-form command for anything not modeled above.
    Raw(RawCommand),
}

impl Command {
    /// Creates the capability negotiation command.
    ///
    /// Must be the first command on a fresh connection; the monitor
    /// rejects everything else until capabilities are negotiated.
    #[inline]
    #[must_use]
    pub fn capabilities() -> Self {
        Self::Monitor(MonitorCommand::Capabilities)
    }

    /// Creates a key press command from key descriptors.
    #[inline]
    #[must_use]
    pub fn send_key(keys: Vec<KeyValue>) -> Self {
        Self::Monitor(MonitorCommand::SendKey { keys })
    }

    /// Creates a screenshot command writing to `filename` on the host.
    #[inline]
    #[must_use]
    pub fn screendump(filename: impl Into<String>) -> Self {
        Self::Monitor(MonitorCommand::Screendump {
            filename: filename.into(),
        })
    }

    /// Creates a free-form command.
    #[inline]
    #[must_use]
    pub fn raw(execute: impl Into<String>, arguments: Option<Value>) -> Self {
        Self::Raw(RawCommand {
            execute: execute.into(),
            arguments,
        })
    }

    /// Returns the wire name of this command.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Monitor(MonitorCommand::Capabilities) => "qmp_capabilities",
            Self::Monitor(MonitorCommand::SendKey { .. }) => "send-key",
            Self::Monitor(MonitorCommand::Screendump { .. }) => "screendump",
            Self::Raw(raw) => &raw.execute,
        }
    }
}

// ============================================================================
// Monitor Commands
// ============================================================================

/// The typed subset of the monitor command set this crate uses.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "execute", content = "arguments")]
pub enum MonitorCommand {
    /// Negotiate capabilities, leaving greeting mode.
    #[serde(rename = "qmp_capabilities")]
    Capabilities,

    /// Press a chord of keys in the guest.
    #[serde(rename = "send-key")]
    SendKey {
        /// Keys pressed together, released on command completion.
        keys: Vec<KeyValue>,
    },

    /// Dump the guest display to an image file on the host.
    #[serde(rename = "screendump")]
    Screendump {
        /// Host-side path the monitor writes the image to.
        filename: String,
    },
}

// ============================================================================
// Raw Command
// ============================================================================

/// A command identified only by its wire name.
///
/// `arguments` is omitted from the serialized form entirely when
/// `None`, matching what the monitor expects for argument-less
/// commands.
#[derive(Debug, Clone, Serialize)]
pub struct RawCommand {
    /// Wire name of the command.
    pub execute: String,
    /// Command arguments, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

// ============================================================================
// Key Values
// ============================================================================

/// A single key in a `send-key` payload.
///
/// The monitor accepts keys either as symbolic key-code names or raw
/// scancodes; this crate only ever sends the symbolic form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum KeyValue {
    /// Symbolic key-code name, e.g. `ctrl`, `f2` or `spc`.
    Qcode(String),
}

impl KeyValue {
    /// Creates a symbolic key-code value.
    #[inline]
    pub fn qcode(name: impl Into<String>) -> Self {
        Self::Qcode(name.into())
    }
}

// ============================================================================
// Tests
// ============================================================================
