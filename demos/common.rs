//! Shared utilities for demos.
//!
//! Provides common functionality used across all demos:
//! - Command-line argument parsing
//! - Logging initialization

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use tracing_subscriber::EnvFilter;

// ============================================================================
// Types
// ============================================================================

/// Command-line arguments for demos.
#[derive(Debug, Clone)]
pub struct Args {
    pub debug: bool,
    pub rest: Vec<String>,
}

impl Args {
    /// Parse command-line arguments: `--` flags first, positionals in `rest`.
    pub fn parse() -> Self {
        let (flags, rest): (Vec<String>, Vec<String>) = std::env::args()
            .skip(1)
            .partition(|a| a.starts_with("--"));
        Self {
            debug: flags.iter().any(|a| a == "--debug"),
            rest,
        }
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Initialize tracing/logging.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        "qemu_autopilot=debug"
    } else {
        "qemu_autopilot=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}
