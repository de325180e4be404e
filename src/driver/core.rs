//! Core Driver struct and connection establishment.
//!
//! The [`Driver`] struct holds validated configuration and opens
//! monitor connections from it.
//!
//! # Example
//!
//! ```no_run
//! use qemu_autopilot::Driver;
//!
//! # async fn example() -> qemu_autopilot::Result<()> {
//! let driver = Driver::builder()
//!     .socket("/tmp/qmp.sock")
//!     .build()?;
//!
//! let monitor = driver.connect().await?;
//! monitor.negotiate_capabilities().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tokio::net::UnixStream;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::monitor::Monitor;
use crate::ocr::TextRecognizer;
use crate::transport::Connection;

use super::builder::DriverBuilder;

// ============================================================================
// Constants
// ============================================================================

/// Environment variable naming the monitor socket.
pub const SOCKET_PATH_ENV: &str = "SOCKET_PATH";

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a driver.
pub(crate) struct DriverInner {
    /// Path to the monitor socket.
    pub socket: PathBuf,

    /// Host path screen captures are written to.
    pub screenshot_path: PathBuf,

    /// Recognizer handed to every monitor.
    pub recognizer: Arc<dyn TextRecognizer>,

    /// Holding directory backing the default capture path.
    pub capture_dir: Option<Arc<TempDir>>,

    /// Per-frame size limit for connections.
    pub max_frame_len: usize,
}

// ============================================================================
// Driver
// ============================================================================

/// Entry point for connecting to a QEMU monitor.
///
/// A driver is validated configuration; [`Driver::connect`] turns it
/// into live [`Monitor`] handles. Drivers are cheap to clone and one
/// driver can open any number of connections to the same socket.
#[derive(Clone)]
pub struct Driver {
    /// Shared inner state.
    pub(crate) inner: Arc<DriverInner>,
}

// ============================================================================
// Driver - Display
// ============================================================================

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("socket", &self.inner.socket)
            .field("screenshot_path", &self.inner.screenshot_path)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Driver - Public API
// ============================================================================

impl Driver {
    /// Creates a configuration builder for the driver.
    #[inline]
    #[must_use]
    pub fn builder() -> DriverBuilder {
        DriverBuilder::new()
    }

    /// Creates a driver from the `SOCKET_PATH` environment variable.
    ///
    /// The conventional way for installer scripts to find the monitor
    /// without carrying their own flag parsing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the variable is not set.
    pub fn from_env() -> Result<Self> {
        let socket = std::env::var_os(SOCKET_PATH_ENV).ok_or_else(|| {
            Error::config(format!(
                "{SOCKET_PATH_ENV} is not set. Point it at the monitor socket.\n\
                 Example: {SOCKET_PATH_ENV}=/tmp/qmp.sock"
            ))
        })?;

        Self::builder().socket(PathBuf::from(socket)).build()
    }

    /// Creates a driver from validated configuration.
    pub(crate) fn new(
        socket: PathBuf,
        screenshot_path: PathBuf,
        recognizer: Arc<dyn TextRecognizer>,
        capture_dir: Option<Arc<TempDir>>,
        max_frame_len: usize,
    ) -> Self {
        Self {
            inner: Arc::new(DriverInner {
                socket,
                screenshot_path,
                recognizer,
                capture_dir,
                max_frame_len,
            }),
        }
    }
}

// ============================================================================
// Driver - Accessors
// ============================================================================

impl Driver {
    /// Returns the monitor socket path.
    #[inline]
    #[must_use]
    pub fn socket_path(&self) -> &Path {
        &self.inner.socket
    }

    /// Returns the path screen captures are written to.
    #[inline]
    #[must_use]
    pub fn screenshot_path(&self) -> &Path {
        &self.inner.screenshot_path
    }
}

// ============================================================================
// Driver - Connection
// ============================================================================

impl Driver {
    /// Connects to the monitor socket.
    ///
    /// The returned monitor is still in greeting mode; call
    /// [`Monitor::negotiate_capabilities`] before issuing commands.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the socket cannot be reached.
    pub async fn connect(&self) -> Result<Monitor> {
        let socket = &self.inner.socket;
        info!(socket = %socket.display(), "connecting to monitor socket");

        let stream = UnixStream::connect(socket).await.map_err(|err| {
            Error::connection(format!(
                "failed to connect to {}: {err}",
                socket.display()
            ))
        })?;

        let connection = Connection::with_max_frame_len(stream, self.inner.max_frame_len);
        debug!("monitor connection established");

        Ok(Monitor::new(
            connection,
            self.inner.screenshot_path.clone(),
            Arc::clone(&self.inner.recognizer),
            self.inner.capture_dir.clone(),
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::UnixListener;

    #[test]
    fn test_driver_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<Driver>();
    }

    #[test]
    fn test_driver_is_debug() {
        fn assert_debug<T: std::fmt::Debug>() {}
        assert_debug::<Driver>();
    }

    #[tokio::test]
    async fn test_connect_and_negotiate_over_unix_socket() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("qmp.sock");
        let listener = UnixListener::bind(&socket).unwrap();

        let peer = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            stream
                .write_all(b"{\"QMP\": {\"version\": {}, \"capabilities\": []}}\n")
                .await
                .unwrap();

            let mut buf = vec![0u8; 128];
            let n = stream.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b"{\"execute\":\"qmp_capabilities\"}\n");
            stream.write_all(b"{\"return\": {}}\n").await.unwrap();
        });

        let driver = Driver::builder().socket(&socket).build().unwrap();
        let monitor = driver.connect().await.unwrap();
        monitor.negotiate_capabilities().await.unwrap();
        monitor.close();
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_fails_when_socket_missing() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("absent.sock");

        let driver = Driver::builder().socket(&socket).build().unwrap();
        let err = driver.connect().await.unwrap_err();

        assert!(err.is_connection_error());
        assert!(err.to_string().contains("failed to connect"));
    }
}
