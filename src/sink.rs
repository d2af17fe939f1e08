//! Append-only line sinks for captured stream output.
//!
//! `LineSink` owns one file handle for the whole session instead of
//! reopening the file per write. Every append is flushed so the file stays
//! inspectable while the stream is live.

use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Append-only UTF-8 text sink with one line terminator per entry.
#[derive(Debug)]
pub struct LineSink {
    path: PathBuf,
    file: File,
}

impl LineSink {
    /// Opens the sink in append mode, creating the file if needed.
    pub async fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .await?;
        Ok(Self { path, file })
    }

    /// Appends one line, terminator included, and flushes.
    pub async fn append(&mut self, line: &str) -> std::io::Result<()> {
        self.file.write_all(line.as_bytes()).await?;
        self.file.write_all(b"\n").await?;
        self.file.flush().await
    }

    /// Path the sink writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes and releases the underlying file handle.
    pub async fn shutdown(mut self) -> std::io::Result<()> {
        self.file.shutdown().await
    }
}

/// Single emit operation with two destinations: stdout and a [`LineSink`].
#[derive(Debug)]
pub struct LineTee {
    sink: LineSink,
}

impl LineTee {
    /// Opens the file side of the tee in append mode.
    pub async fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        Ok(Self {
            sink: LineSink::open(path).await?,
        })
    }

    /// Prints the line and appends it to the sink.
    pub async fn emit(&mut self, line: &str) -> std::io::Result<()> {
        println!("{line}");
        self.sink.append(line).await
    }

    /// Flushes and releases the file side.
    pub async fn shutdown(self) -> std::io::Result<()> {
        self.sink.shutdown().await
    }
}
