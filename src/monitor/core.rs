//! Core Monitor struct and accessors.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tempfile::TempDir;
use tracing::debug;

use crate::error::Result;
use crate::ocr::TextRecognizer;
use crate::protocol::Command;
use crate::transport::Connection;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a monitor handle.
pub(crate) struct MonitorInner {
    /// Transport to the monitor socket.
    pub connection: Connection,
    /// Host path the monitor writes screen captures to.
    pub screenshot_path: PathBuf,
    /// Recognizer used by screen text probes.
    pub recognizer: Arc<dyn TextRecognizer>,
    /// Keeps a driver-created capture directory alive while captures
    /// still land in it.
    pub _capture_dir: Option<Arc<TempDir>>,
}

// ============================================================================
// Monitor
// ============================================================================

/// A handle to a connected guest monitor.
///
/// Monitors provide methods for keyboard input, screen capture and
/// screen-text waits. Handles are cheap to clone and share one
/// underlying connection.
#[derive(Clone)]
pub struct Monitor {
    pub(crate) inner: Arc<MonitorInner>,
}

impl fmt::Debug for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("connection", &self.inner.connection)
            .field("screenshot_path", &self.inner.screenshot_path)
            .finish_non_exhaustive()
    }
}

impl Monitor {
    /// Creates a new monitor handle.
    pub(crate) fn new(
        connection: Connection,
        screenshot_path: PathBuf,
        recognizer: Arc<dyn TextRecognizer>,
        capture_dir: Option<Arc<TempDir>>,
    ) -> Self {
        Self {
            inner: Arc::new(MonitorInner {
                connection,
                screenshot_path,
                recognizer,
                _capture_dir: capture_dir,
            }),
        }
    }
}

// ============================================================================
// Monitor - Accessors
// ============================================================================

impl Monitor {
    /// Returns the underlying connection.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.inner.connection
    }

    /// Returns the path screen captures are written to.
    #[inline]
    #[must_use]
    pub fn screenshot_path(&self) -> &Path {
        &self.inner.screenshot_path
    }
}

// ============================================================================
// Monitor - Commands
// ============================================================================

impl Monitor {
    /// Negotiates capabilities, unlocking command execution.
    ///
    /// A fresh monitor connection only answers this one command; call
    /// it once right after connecting.
    pub async fn negotiate_capabilities(&self) -> Result<()> {
        self.inner
            .connection
            .execute(Command::capabilities())
            .await?;
        debug!("capabilities negotiated");
        Ok(())
    }

    /// Executes a command by wire name.
    ///
    /// Escape hatch for monitor commands the typed API does not cover.
    /// Returns the reply payload.
    pub async fn execute(&self, command: &str, arguments: Option<Value>) -> Result<Value> {
        self.inner
            .connection
            .execute(Command::raw(command, arguments))
            .await
    }

    /// Closes the connection.
    ///
    /// Commands still awaiting replies fail with
    /// [`Error::ConnectionClosed`](crate::Error::ConnectionClosed).
    pub fn close(&self) {
        self.inner.connection.close();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use crate::ocr::Tesseract;

    fn monitor_over(stream: tokio::io::DuplexStream) -> Monitor {
        Monitor::new(
            Connection::open(stream),
            PathBuf::from("/tmp/autopilot-test.ppm"),
            Arc::new(Tesseract::new()),
            None,
        )
    }

    #[test]
    fn test_monitor_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<Monitor>();
    }

    #[test]
    fn test_monitor_is_debug() {
        fn assert_debug<T: std::fmt::Debug>() {}
        assert_debug::<Monitor>();
    }

    #[tokio::test]
    async fn test_negotiate_capabilities() {
        let (client, mut server) = tokio::io::duplex(1024);
        let monitor = monitor_over(client);

        let peer = tokio::spawn(async move {
            let mut buf = vec![0u8; 64];
            let n = server.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b"{\"execute\":\"qmp_capabilities\"}\n");
            server.write_all(b"{\"return\": {}}\n").await.unwrap();
        });

        monitor.negotiate_capabilities().await.unwrap();
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_raw_execute_returns_payload() {
        let (client, mut server) = tokio::io::duplex(1024);
        let monitor = monitor_over(client);

        let peer = tokio::spawn(async move {
            let mut buf = vec![0u8; 64];
            let n = server.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b"{\"execute\":\"query-status\"}\n");
            server
                .write_all(b"{\"return\": {\"status\": \"running\"}}\n")
                .await
                .unwrap();
        });

        let value = monitor.execute("query-status", None).await.unwrap();
        assert_eq!(value["status"], "running");
        peer.await.unwrap();
    }
}
