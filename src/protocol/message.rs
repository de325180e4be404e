//! Incoming message parsing and classification.
//!
//! The monitor sends three kinds of lines and none of them carry a
//! request identifier:
//!
//! | Shape | Classified as |
//! |-------|---------------|
//! | `{"return": ...}` | [`Reply::Success`] |
//! | `{"error": {"class": ..., "desc": ...}}` | [`Reply::Error`] |
//! | `{"event": ..., ...}` and everything else | [`Event`] |
//!
//! Replies (success and error alike) each answer exactly one command,
//! in order. Events are asynchronous and may arrive at any point,
//! including between a command and its reply; the greeting banner sent
//! on connect is classified as an event too.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

use crate::error::{Error, Result};

// ============================================================================
// Message
// ============================================================================

/// A classified incoming frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Answer to the oldest in-flight command.
    Reply(Reply),
    /// Asynchronous notification, not tied to any command.
    Event(Event),
}

impl Message {
    /// Parses one frame of text into a classified message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedMessage`] when the frame is not valid
    /// JSON.
    pub fn parse(frame: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(frame).map_err(|err| Error::malformed(err.to_string(), frame))?;
        Ok(Self::classify(value))
    }

    /// Classifies an already-parsed value.
    ///
    /// A `return` key marks a success reply and an `error` key an error
    /// reply; anything else is an event. Error replies consume a reply
    /// slot just like successes, so a rejected command cannot shift
    /// later replies onto the wrong callers.
    #[must_use]
    pub fn classify(mut value: Value) -> Self {
        if let Some(result) = value.get_mut("return") {
            return Self::Reply(Reply::Success(result.take()));
        }

        if let Some(error) = value.get("error") {
            let class = error
                .get("class")
                .and_then(Value::as_str)
                .unwrap_or("GenericError")
                .to_owned();
            let desc = error
                .get("desc")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned();
            return Self::Reply(Reply::Error { class, desc });
        }

        let name = value
            .get("event")
            .and_then(Value::as_str)
            .map(str::to_owned);
        Self::Event(Event {
            name,
            payload: value,
        })
    }

    /// Returns `true` if this message answers a pending command.
    #[inline]
    #[must_use]
    pub fn is_reply(&self) -> bool {
        matches!(self, Self::Reply(_))
    }
}

// ============================================================================
// Reply
// ============================================================================

/// Answer to a single command, success or failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The command succeeded; holds the `return` payload.
    Success(Value),
    /// The monitor rejected the command.
    Error {
        /// Error class reported by the monitor.
        class: String,
        /// Human-readable description.
        desc: String,
    },
}

impl Reply {
    /// Returns `true` if the command succeeded.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Converts the reply into a result, surfacing monitor rejections
    /// as [`Error::CommandFailed`].
    pub fn into_result(self) -> Result<Value> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Error { class, desc } => Err(Error::command_failed(class, desc)),
        }
    }
}

// ============================================================================
// Event
// ============================================================================

/// An asynchronous notification from the monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Event name from the `event` field, absent for the greeting.
    pub name: Option<String>,
    /// The full message payload.
    pub payload: Value,
}

impl Event {
    /// Returns the event name, or an empty string when absent.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Returns `true` if this is the greeting banner the monitor sends
    /// when a client connects.
    #[inline]
    #[must_use]
    pub fn is_greeting(&self) -> bool {
        self.payload.get("QMP").is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================
