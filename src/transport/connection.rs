//! Monitor connection and event loop.
//!
//! This module owns the socket to the monitor, including frame
//! decoding, command/reply correlation and event handling.
//!
//! # Event Loop
//!
//! The connection spawns a tokio task that handles:
//!
//! - Incoming bytes from the monitor (decoded into replies and events)
//! - Outgoing commands from the Rust API
//! - Command/reply correlation by arrival order
//!
//! Replies carry no identifiers, so the loop keeps a FIFO of commands
//! awaiting replies and completes the oldest one per reply. A new
//! command is queued before its bytes are written, which keeps that
//! pairing correct even when the monitor answers instantly.
//!
//! Events are logged and dropped; nothing in the installer workflows
//! consumes them. Unsolvable conditions (malformed frames, unsolicited
//! replies, oversized frames) terminate the loop, failing every
//! pending command, because the reply pairing cannot be re-synchronized
//! once the stream is suspect.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::result::Result as StdResult;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, trace};

use crate::error::{Error, Result};
use crate::protocol::{Command, Message};

use super::codec::{DEFAULT_MAX_FRAME_LEN, FrameDecoder};
use super::queue::{CorrelationQueue, ReplySender};

// ============================================================================
// Constants
// ============================================================================

/// Size of the socket read buffer.
const READ_BUFFER_LEN: usize = 8 * 1024;

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Write a command and register it for the next unclaimed reply.
    Execute {
        command: Command,
        reply_tx: ReplySender,
    },
    /// Shut the connection down.
    Shutdown,
}

// ============================================================================
// Connection
// ============================================================================

/// Connection to a monitor socket.
///
/// Handles command/reply correlation and event classification.
/// The connection spawns an internal event loop task.
///
/// # Thread Safety
///
/// `Connection` is `Send + Sync` and can be shared across tasks;
/// concurrent commands are answered in submission order. Dropping
/// every handle shuts the connection down, [`Connection::close`] does
/// it explicitly.
#[derive(Clone)]
pub struct Connection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Commands awaiting replies (shared with event loop).
    pending: Arc<Mutex<CorrelationQueue>>,
    /// Why the event loop died, for commands issued afterwards.
    close_reason: Arc<Mutex<Option<String>>>,
}

impl Connection {
    /// Creates a connection over an established stream.
    ///
    /// Spawns the event loop task internally.
    pub(crate) fn open<S>(stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        Self::with_max_frame_len(stream, DEFAULT_MAX_FRAME_LEN)
    }

    /// Creates a connection with a custom per-frame size limit.
    pub(crate) fn with_max_frame_len<S>(stream: S, max_frame_len: usize) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let pending = Arc::new(Mutex::new(CorrelationQueue::new()));
        let close_reason: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

        tokio::spawn(Self::run_event_loop(
            stream,
            command_rx,
            Arc::clone(&pending),
            Arc::clone(&close_reason),
            max_frame_len,
        ));

        Self {
            command_tx,
            pending,
            close_reason,
        }
    }

    /// Executes a command and waits for its reply.
    ///
    /// Replies are matched to commands by order alone, so a command
    /// issued while others are in flight simply waits its turn.
    ///
    /// # Errors
    ///
    /// - [`Error::CommandFailed`] if the monitor rejects the command
    /// - [`Error::ConnectionClosed`] if the connection was closed
    /// - [`Error::Connection`] if the transport died, with the reason
    pub async fn execute(&self, command: Command) -> Result<Value> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(ConnectionCommand::Execute { command, reply_tx })
            .map_err(|_| self.closed_error())?;

        match reply_rx.await {
            Ok(reply) => reply?.into_result(),
            Err(_) => Err(self.closed_error()),
        }
    }

    /// Returns the number of commands awaiting replies.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Returns `true` once the event loop has terminated.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    /// Shuts the connection down.
    ///
    /// The write side is closed and every command still awaiting a
    /// reply fails with [`Error::ConnectionClosed`].
    pub fn close(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    /// Error reported for commands issued after the loop has died.
    fn closed_error(&self) -> Error {
        match self.close_reason.lock().as_deref() {
            Some(reason) => Error::connection(reason.to_owned()),
            None => Error::ConnectionClosed,
        }
    }

    /// Event loop that owns the stream.
    async fn run_event_loop<S>(
        stream: S,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        pending: Arc<Mutex<CorrelationQueue>>,
        close_reason: Arc<Mutex<Option<String>>>,
        max_frame_len: usize,
    ) where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (mut read_half, mut write_half) = tokio::io::split(stream);
        let mut decoder = FrameDecoder::with_max_frame_len(max_frame_len);
        let mut read_buf = vec![0u8; READ_BUFFER_LEN];

        let exit_reason: Option<String> = loop {
            tokio::select! {
                // Incoming bytes from the monitor
                read = read_half.read(&mut read_buf) => {
                    match read {
                        Ok(0) => {
                            debug!("stream closed by peer");
                            break Some("stream closed by peer".to_owned());
                        }

                        Ok(n) => {
                            if let Err(err) = Self::handle_incoming(&read_buf[..n], &mut decoder, &pending) {
                                error!(error = %err, "terminating on protocol error");
                                break Some(err.to_string());
                            }
                        }

                        Err(err) => {
                            error!(error = %err, "socket read failed");
                            break Some(format!("read failed: {err}"));
                        }
                    }
                }

                // Commands from the Rust API
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Execute { command, reply_tx }) => {
                            if let Err(reason) = Self::handle_execute(
                                command,
                                reply_tx,
                                &mut write_half,
                                &pending,
                            ).await {
                                error!(error = %reason, "socket write failed");
                                break Some(reason);
                            }
                        }

                        Some(ConnectionCommand::Shutdown) => {
                            debug!("shutdown command received");
                            let _ = write_half.shutdown().await;
                            break None;
                        }

                        None => {
                            debug!("all connection handles dropped");
                            let _ = write_half.shutdown().await;
                            break None;
                        }
                    }
                }
            }
        };

        // Commands still pending must not be left waiting forever.
        let failed = match exit_reason {
            Some(reason) => {
                *close_reason.lock() = Some(reason.clone());
                pending
                    .lock()
                    .fail_all(|| Error::connection(reason.clone()))
            }
            None => pending.lock().fail_all(|| Error::ConnectionClosed),
        };
        if failed > 0 {
            debug!(count = failed, "failed pending commands on loop exit");
        }

        debug!("event loop terminated");
    }

    /// Decodes one chunk and dispatches the frames it completed.
    ///
    /// An error return is fatal to the connection.
    fn handle_incoming(
        chunk: &[u8],
        decoder: &mut FrameDecoder,
        pending: &Arc<Mutex<CorrelationQueue>>,
    ) -> Result<()> {
        for frame in decoder.feed(chunk)? {
            trace!(frame = %frame, "frame received");
            match Message::parse(&frame)? {
                Message::Reply(reply) => pending.lock().complete(reply)?,
                Message::Event(event) => {
                    if event.is_greeting() {
                        debug!("greeting received");
                    } else {
                        debug!(event = event.name(), "event dropped");
                    }
                }
            }
        }
        Ok(())
    }

    /// Writes one command, registering it for the next unclaimed reply.
    ///
    /// An error return carries the reason and is fatal: the written
    /// prefix cannot be unsent, so after a failed write the pairing of
    /// later replies is unknowable.
    async fn handle_execute<W>(
        command: Command,
        reply_tx: ReplySender,
        write_half: &mut W,
        pending: &Arc<Mutex<CorrelationQueue>>,
    ) -> StdResult<(), String>
    where
        W: AsyncWrite + Unpin,
    {
        let mut line = match serde_json::to_vec(&command) {
            Ok(line) => line,
            Err(err) => {
                let _ = reply_tx.send(Err(Error::Json(err)));
                return Ok(());
            }
        };
        line.push(b'\n');

        // The slot must exist before the bytes do: a reply racing the
        // write must always find its command already queued.
        pending.lock().push(reply_tx);

        if let Err(err) = write_half.write_all(&line).await {
            return Err(format!("write failed: {err}"));
        }
        if let Err(err) = write_half.flush().await {
            return Err(format!("flush failed: {err}"));
        }

        trace!(command = command.name(), "command sent");
        Ok(())
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("pending", &self.pending_count())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use tokio::io::DuplexStream;
    use tokio::task::yield_now;
    use tokio_test::assert_ok;

    /// Reads one newline-terminated request off the scripted peer.
    async fn read_line(stream: &mut DuplexStream) -> String {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            let n = stream.read(&mut byte).await.unwrap();
            if n == 0 || byte[0] == b'\n' {
                break;
            }
            line.push(byte[0]);
        }
        String::from_utf8(line).unwrap()
    }

    /// Yields until the command under test is registered as pending.
    async fn wait_for_pending(conn: &Connection) {
        while conn.pending_count() == 0 {
            yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_execute_resolves_with_reply() {
        let (client, mut server) = tokio::io::duplex(1024);
        let conn = Connection::open(client);

        let peer = tokio::spawn(async move {
            let line = read_line(&mut server).await;
            assert_eq!(line, r#"{"execute":"qmp_capabilities"}"#);
            server.write_all(b"{\"return\": {}}\n").await.unwrap();
            server
        });

        let value = assert_ok!(conn.execute(Command::capabilities()).await);
        assert_eq!(value, json!({}));
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_replies_resolve_in_submission_order() {
        let (client, mut server) = tokio::io::duplex(1024);
        let conn = Connection::open(client);

        let peer = tokio::spawn(async move {
            assert_eq!(read_line(&mut server).await, r#"{"execute":"query-status"}"#);
            assert_eq!(read_line(&mut server).await, r#"{"execute":"query-name"}"#);
            server
                .write_all(b"{\"event\": \"RTC_CHANGE\"}\n{\"return\": \"first\"}\n")
                .await
                .unwrap();
            server
                .write_all(b"{\"event\": \"RESET\"}\n{\"return\": \"second\"}\n")
                .await
                .unwrap();
            server
        });

        let (first, second) = tokio::join!(
            conn.execute(Command::raw("query-status", None)),
            conn.execute(Command::raw("query-name", None)),
        );

        assert_eq!(first.unwrap(), json!("first"));
        assert_eq!(second.unwrap(), json!("second"));
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_greeting_does_not_consume_a_reply() {
        let (client, mut server) = tokio::io::duplex(1024);
        let conn = Connection::open(client);

        let peer = tokio::spawn(async move {
            server
                .write_all(b"{\"QMP\": {\"version\": {}, \"capabilities\": []}}\n")
                .await
                .unwrap();
            let _ = read_line(&mut server).await;
            server.write_all(b"{\"return\": 7}\n").await.unwrap();
            server
        });

        let value = conn.execute(Command::capabilities()).await.unwrap();
        assert_eq!(value, json!(7));
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_reply_split_across_writes() {
        let (client, mut server) = tokio::io::duplex(1024);
        let conn = Connection::open(client);

        let peer = tokio::spawn(async move {
            let _ = read_line(&mut server).await;
            server.write_all(b"{\"retu").await.unwrap();
            yield_now().await;
            server.write_all(b"rn\": \"ok\"}\n").await.unwrap();
            server
        });

        let value = conn.execute(Command::capabilities()).await.unwrap();
        assert_eq!(value, json!("ok"));
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_error_reply_keeps_connection_usable() {
        let (client, mut server) = tokio::io::duplex(1024);
        let conn = Connection::open(client);

        let peer = tokio::spawn(async move {
            let _ = read_line(&mut server).await;
            server
                .write_all(
                    b"{\"error\": {\"class\": \"CommandNotFound\", \"desc\": \"unknown\"}}\n",
                )
                .await
                .unwrap();
            let _ = read_line(&mut server).await;
            server.write_all(b"{\"return\": true}\n").await.unwrap();
            server
        });

        let err = conn
            .execute(Command::raw("bogus-command", None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CommandFailed { .. }));

        // The failed command consumed exactly one reply slot.
        let value = conn.execute(Command::capabilities()).await.unwrap();
        assert_eq!(value, json!(true));
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_close_fails_pending_commands() {
        let (client, _server) = tokio::io::duplex(1024);
        let conn = Connection::open(client);

        let pending = tokio::spawn({
            let conn = conn.clone();
            async move { conn.execute(Command::raw("query-status", None)).await }
        });
        wait_for_pending(&conn).await;

        conn.close();

        let err = pending.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_execute_after_close_fails() {
        let (client, _server) = tokio::io::duplex(1024);
        let conn = Connection::open(client);

        conn.close();
        while !conn.is_closed() {
            yield_now().await;
        }

        let err = conn.execute(Command::capabilities()).await.unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_malformed_frame_fails_pending_command() {
        let (client, mut server) = tokio::io::duplex(1024);
        let conn = Connection::open(client);

        let pending = tokio::spawn({
            let conn = conn.clone();
            async move { conn.execute(Command::raw("query-status", None)).await }
        });
        wait_for_pending(&conn).await;

        server.write_all(b"this is not json\n").await.unwrap();

        let err = pending.await.unwrap().unwrap_err();
        assert!(err.is_connection_error());
        assert!(err.to_string().contains("Malformed message"));
    }

    #[tokio::test]
    async fn test_unsolicited_reply_kills_connection() {
        let (client, mut server) = tokio::io::duplex(1024);
        let conn = Connection::open(client);

        server.write_all(b"{\"return\": {}}\n").await.unwrap();
        while !conn.is_closed() {
            yield_now().await;
        }

        let err = conn.execute(Command::capabilities()).await.unwrap_err();
        assert!(err.to_string().contains("Protocol violation"));
    }

    #[tokio::test]
    async fn test_peer_hangup_fails_pending_command() {
        let (client, server) = tokio::io::duplex(1024);
        let conn = Connection::open(client);

        let pending = tokio::spawn({
            let conn = conn.clone();
            async move { conn.execute(Command::raw("query-status", None)).await }
        });
        wait_for_pending(&conn).await;

        drop(server);

        let err = pending.await.unwrap().unwrap_err();
        assert!(err.is_connection_error());
        assert!(err.to_string().contains("closed by peer"));
    }

    #[tokio::test]
    async fn test_events_alone_never_resolve_commands() {
        let (client, mut server) = tokio::io::duplex(1024);
        let conn = Connection::open(client);

        let pending = tokio::spawn({
            let conn = conn.clone();
            async move { conn.execute(Command::raw("query-status", None)).await }
        });
        wait_for_pending(&conn).await;

        server
            .write_all(b"{\"event\": \"RESET\"}\n{\"event\": \"POWERDOWN\"}\n")
            .await
            .unwrap();
        yield_now().await;
        assert_eq!(conn.pending_count(), 1);

        server.write_all(b"{\"return\": null}\n").await.unwrap();
        let value = pending.await.unwrap().unwrap();
        assert_eq!(value, json!(null));
    }
}
