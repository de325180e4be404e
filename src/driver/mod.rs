//! Driver module.
//!
//! This module provides the main entry point for guest automation.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Driver`] | Factory for opening monitor connections |
//! | [`DriverBuilder`] | Fluent configuration builder |
//!
//! # Example
//!
//! ```no_run
//! use qemu_autopilot::{Driver, Result, Wait};
//!
//! # async fn example() -> Result<()> {
//! let driver = Driver::builder()
//!     .socket("/tmp/qmp.sock")
//!     .build()?;
//!
//! let monitor = driver.connect().await?;
//! monitor.negotiate_capabilities().await?;
//!
//! monitor.wait_for_text("boot menu", "Install", Wait::seconds(120)).await?;
//! monitor.type_text("yes\n").await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for driver configuration.
pub mod builder;

/// Core driver implementation.
pub mod core;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::DriverBuilder;
pub use core::{Driver, SOCKET_PATH_ENV};
