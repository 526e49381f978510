//! titlebot: an IRC channel companion that announces page titles for posted
//! URLs and answers `#seen` activity queries.
//!
//! The transport delivers [`InboundMessage`] events to the
//! [`dispatch::Dispatcher`], which fans each message out to detached handler
//! tasks: URL title announcement ([`urls`]), activity tracking and `#seen`
//! queries ([`seen`]). Handlers reply through an outbound channel that the
//! run loop forwards to the transport.

pub mod config;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod messaging;
pub mod seen;
pub mod titles;
pub mod urls;

pub use error::{Error, Result};

/// A single chat message delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Nick of the message author, as it appeared on the wire.
    pub author: String,
    /// Raw message text.
    pub text: String,
    /// Channel or nick the message was addressed to.
    pub channel: String,
}

/// A message the bot wants delivered back to the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub target: String,
    pub text: String,
}
