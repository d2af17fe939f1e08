//! Realtime stream modules.
//!
//! - `client`: websocket transport, subscription handshake, and tagged
//!   connection events.
//! - `proto`: protocol messages shared with the RPC node.
//! - `session`: the end-to-end receive loop with sink output and terminal
//!   outcome classification.

/// Websocket connection and subscription handshake.
pub mod client;
/// Wire protocol messages and the frame parser.
pub mod proto;
/// Session loop that prints and persists received log lines.
pub mod session;
