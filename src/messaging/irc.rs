//! IRC transport adapter built on the `irc` crate.

use crate::error::TransportError;
use crate::messaging::{ChatTransport, InboundStream};
use crate::InboundMessage;

use futures::StreamExt as _;
use irc::client::prelude::{Client, Command, Config as IrcConfig};
use irc::client::{ClientStream, Sender};
use tokio::sync::Mutex;

/// IRC adapter state. Connection and registration happen in [`connect`];
/// the raw protocol stream is held until the run loop claims it via `start`.
///
/// [`connect`]: IrcTransport::connect
pub struct IrcTransport {
    nick: String,
    room: String,
    hello_message: Option<String>,
    sender: Sender,
    stream: Mutex<Option<ClientStream>>,
}

impl IrcTransport {
    /// Connect and register with the IRC server. The configured room is
    /// joined automatically after registration.
    pub async fn connect(config: &crate::config::Config) -> crate::Result<Self> {
        let irc_config = IrcConfig {
            server: Some(config.server.clone()),
            port: Some(config.port),
            use_tls: Some(config.use_tls),
            nickname: Some(config.nick.clone()),
            username: Some(config.username.clone()),
            channels: vec![config.room.clone()],
            ..IrcConfig::default()
        };

        let mut client = Client::from_config(irc_config)
            .await
            .map_err(TransportError::Irc)?;
        client.identify().map_err(TransportError::Irc)?;
        let stream = client.stream().map_err(TransportError::Irc)?;
        tracing::info!(server = %config.server, nick = %config.nick, "connected to IRC");

        Ok(Self {
            nick: config.nick.clone(),
            room: config.room.clone(),
            hello_message: config.hello_message.clone(),
            sender: client.sender(),
            stream: Mutex::new(Some(stream)),
        })
    }
}

impl ChatTransport for IrcTransport {
    fn name(&self) -> &str {
        "irc"
    }

    async fn start(&self) -> crate::Result<InboundStream> {
        let stream = self
            .stream
            .lock()
            .await
            .take()
            .ok_or(TransportError::AlreadyStarted)?;

        let sender = self.sender.clone();
        let nick = self.nick.clone();
        let room = self.room.clone();
        let hello_message = self.hello_message.clone();

        // PRIVMSG events become InboundMessages; everything else is consumed
        // here. Protocol errors are logged and skipped so a transient parse
        // failure does not end the stream.
        let inbound = stream.filter_map(move |event| {
            let sender = sender.clone();
            let nick = nick.clone();
            let room = room.clone();
            let hello_message = hello_message.clone();

            async move {
                let message = match event {
                    Ok(message) => message,
                    Err(error) => {
                        tracing::warn!(%error, "irc stream error");
                        return None;
                    }
                };

                match &message.command {
                    Command::JOIN(channel, ..)
                        if message.source_nickname() == Some(nick.as_str()) =>
                    {
                        tracing::info!(%channel, "joined room");
                        if let Some(hello) = &hello_message
                            && channel == &room
                            && let Err(error) = sender.send_privmsg(&room, hello)
                        {
                            tracing::warn!(%error, "failed to send hello message");
                        }
                        None
                    }
                    Command::PRIVMSG(target, text) => {
                        let author = message.source_nickname()?.to_owned();
                        Some(InboundMessage {
                            author,
                            text: text.clone(),
                            channel: target.clone(),
                        })
                    }
                    _ => None,
                }
            }
        });

        Ok(Box::pin(inbound))
    }

    async fn send_message(&self, target: &str, text: &str) -> crate::Result<()> {
        self.sender
            .send_privmsg(target, text)
            .map_err(TransportError::Irc)?;
        Ok(())
    }

    async fn shutdown(&self) -> crate::Result<()> {
        self.sender
            .send_quit("titlebot signing off")
            .map_err(TransportError::Irc)?;
        tracing::info!("irc transport shut down");
        Ok(())
    }
}
