//! Realtime Solana transaction log streaming over websockets.
//!
//! The crate is organized by concern:
//! - `stream`: websocket client, wire protocol types, and the session loop
//!   that drives one subscription from connect to terminal close.
//! - `sink`: append-only line sinks for the captured output.

/// Append-only line sinks and the console/file tee.
pub mod sink;
/// Realtime stream client, protocol types, and session loop.
pub mod stream;
