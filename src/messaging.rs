//! Chat transport abstraction and adapters.

pub mod irc;

pub use irc::IrcTransport;

use crate::InboundMessage;

use futures::Stream;
use std::pin::Pin;

/// Stream of messages arriving from the chat network.
pub type InboundStream = Pin<Box<dyn Stream<Item = InboundMessage> + Send>>;

/// A connected chat transport.
///
/// The core registers exactly one inbound stream per connection and sends
/// announcements back through `send_message`.
pub trait ChatTransport: Send + Sync {
    fn name(&self) -> &str;

    /// Take the inbound message stream. Callable once per connection.
    async fn start(&self) -> crate::Result<InboundStream>;

    /// Send a message to a channel or nick.
    async fn send_message(&self, target: &str, text: &str) -> crate::Result<()>;

    async fn shutdown(&self) -> crate::Result<()>;
}
