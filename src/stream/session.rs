//! End-to-end stream session.
//!
//! `StreamSession` owns one connection lifetime: it opens the journal sink,
//! connects and subscribes, prints and persists every received log line, and
//! classifies how the session ended. Per-frame parse failures never end the
//! loop; losing the channel does.

use std::path::PathBuf;

use crate::sink::LineTee;
use crate::stream::client::{ConnectionEvent, StreamClient, StreamConfigure, StreamError};
use crate::stream::proto;

/// Default sink for received log lines and per-frame diagnostics.
pub const JOURNAL_PATH: &str = "solana.txt";
/// Default sink for the terminal session status line.
pub const STATUS_PATH: &str = "solana_logs.txt";

const SEPARATOR_WIDTH: usize = 80;

/// Terminal state of a session, recorded exactly once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The peer or the transport closed the channel.
    Closed {
        /// Closure reason as reported by the transport.
        reason: String,
    },
    /// The session ended on an error that is not a closure.
    Failed {
        /// Short error kind name.
        kind: String,
        /// Full error message.
        message: String,
    },
}

impl SessionOutcome {
    /// Status line written to the console and the status sink.
    pub fn message(&self) -> String {
        match self {
            Self::Closed { reason } => format!("WebSocket connection closed: {reason}"),
            Self::Failed { kind, message } => format!("Unexpected error: {kind}: {message}"),
        }
    }
}

/// One end-to-end streaming session from connect to terminal close.
#[derive(Debug)]
pub struct StreamSession {
    client: StreamClient,
    configure: StreamConfigure,
    journal_path: PathBuf,
    status_path: PathBuf,
}

impl StreamSession {
    /// Creates a session with the default subscription and sink paths.
    pub fn new(client: StreamClient) -> Self {
        Self {
            client,
            configure: StreamConfigure::default(),
            journal_path: PathBuf::from(JOURNAL_PATH),
            status_path: PathBuf::from(STATUS_PATH),
        }
    }

    /// Sets the subscription parameters.
    pub fn with_configure(mut self, configure: StreamConfigure) -> Self {
        self.configure = configure;
        self
    }

    /// Sets the journal sink path.
    pub fn with_journal_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.journal_path = path.into();
        self
    }

    /// Sets the status sink path.
    pub fn with_status_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.status_path = path.into();
        self
    }

    /// Runs the session until the stream terminates.
    ///
    /// The outcome is recorded to the console and the status sink, then
    /// returned. This never propagates an error: a session's end is not a
    /// program-level failure.
    pub async fn run(self) -> SessionOutcome {
        let outcome = match self.stream().await {
            Ok(end) => end,
            Err(err) => SessionOutcome::Failed {
                kind: err.kind().to_string(),
                message: err.to_string(),
            },
        };

        self.record(&outcome).await;
        outcome
    }

    /// Opens the journal, drives the receive loop, and guarantees the sink
    /// is flushed and released on every exit path.
    async fn stream(&self) -> Result<SessionOutcome, StreamError> {
        let mut journal = LineTee::open(&self.journal_path).await?;
        let result = self.pump(&mut journal).await;
        let flushed = journal.shutdown().await;

        let end = result?;
        flushed?;
        Ok(end)
    }

    async fn pump(&self, journal: &mut LineTee) -> Result<SessionOutcome, StreamError> {
        let mut connection = self.client.connect(&self.configure).await?;
        tracing::info!(endpoint = self.client.endpoint(), "subscribed to logs");

        loop {
            match connection.next_event().await {
                ConnectionEvent::Frame(text) => self.handle_frame(&text, journal).await?,
                ConnectionEvent::Closed { reason } => {
                    connection.close().await;
                    return Ok(SessionOutcome::Closed { reason });
                }
                ConnectionEvent::Failed(err) => return Err(err),
            }
        }
    }

    async fn handle_frame(&self, text: &str, journal: &mut LineTee) -> Result<(), StreamError> {
        match proto::parse_notification(text) {
            Ok(notification) => {
                for line in notification.log_lines() {
                    journal.emit(line).await?;
                }
                journal.emit(&separator()).await?;
            }
            Err(err) => {
                tracing::warn!(error = %err, "discarding frame");
                journal.emit(err.diagnostic()).await?;
            }
        }
        Ok(())
    }

    async fn record(&self, outcome: &SessionOutcome) {
        let message = outcome.message();
        match LineTee::open(&self.status_path).await {
            Ok(mut status) => {
                if let Err(err) = status.emit(&message).await {
                    tracing::error!(error = %err, "could not record session outcome");
                } else if let Err(err) = status.shutdown().await {
                    tracing::error!(error = %err, "could not flush status sink");
                }
            }
            Err(err) => {
                // Status sink unavailable: keep the console side of the write.
                println!("{message}");
                tracing::error!(error = %err, "could not open status sink");
            }
        }
    }
}

fn separator() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}
