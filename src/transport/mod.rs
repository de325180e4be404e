//! Monitor transport layer.
//!
//! This module handles communication with the monitor socket:
//! splitting the byte stream into frames, pairing replies with the
//! commands that caused them, and driving the socket from a single
//! event loop task.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Client (Rust)  │                              │  QEMU           │
//! │                 │        Unix socket           │                 │
//! │  Connection     │◄────────────────────────────►│  QMP monitor    │
//! │  ├ FrameDecoder │     line-delimited JSON      │                 │
//! │  └ Correlation  │                              │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Driver::connect` - Connect to the monitor socket
//! 2. `Connection` - Execute commands, correlate replies by order
//! 3. `Connection::close` - Close and fail whatever is still pending
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `codec` | Newline-delimited frame decoding |
//! | `queue` | Positional command/reply correlation |
//! | `connection` | Socket connection and event loop |

// ============================================================================
// Submodules
// ============================================================================

/// Newline-delimited frame decoding.
pub mod codec;

/// Socket connection and event loop.
pub mod connection;

/// Positional command/reply correlation.
pub mod queue;

// ============================================================================
// Re-exports
// ============================================================================

pub use codec::{DEFAULT_MAX_FRAME_LEN, FrameDecoder};
pub use connection::Connection;
pub use queue::CorrelationQueue;
