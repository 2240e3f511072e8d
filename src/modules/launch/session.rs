//! One browser connection on `/ws`.
//!
//! The session reads JSON frames, validates `open` requests and relays the
//! output of a single adb launch at a time. Closing the socket while a launch
//! is streaming drops the process, which kills it.

use std::time::Duration;

use axum::extract::ws::Message;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde_json::Value;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::dto::{ClientMessage, ServerMessage};
use super::validator;
use crate::infrastructure::adb::bridge::AdbBridge;

pub const GREETING: &str = "WebSocket connected. Please send a YouTube URL.";
const JSON_HINT: &str =
    r#"Please send data in JSON format. Example: {"type":"open","url":"https://youtu.be/..."}"#;

const BUSY: &str = "A launch is already in progress, wait for it to finish";

/// The peer went away or the socket failed.
#[derive(Debug)]
struct Disconnected;

pub struct Session<Tx, Rx> {
    bridge: AdbBridge,
    tx: Tx,
    rx: Rx,
    heartbeat: Interval,
}

impl<Tx, Rx> Session<Tx, Rx>
where
    Tx: Sink<Message> + Unpin,
    Rx: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    pub fn new(bridge: AdbBridge, heartbeat: Duration, tx: Tx, rx: Rx) -> Self {
        let mut heartbeat = tokio::time::interval_at(tokio::time::Instant::now() + heartbeat, heartbeat);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            bridge,
            tx,
            rx,
            heartbeat,
        }
    }

    pub async fn run(mut self) {
        info!("WebSocket session opened");

        if self.send(ServerMessage::log(GREETING)).await.is_ok() {
            let _ = self.serve().await;
        }

        info!("WebSocket session closed");
    }

    async fn serve(&mut self) -> Result<(), Disconnected> {
        loop {
            tokio::select! {
                incoming = self.rx.next() => match incoming {
                    Some(Ok(Message::Text(text))) => self.handle_text(text.as_str()).await?,
                    Some(Ok(Message::Close(_))) | None => return Ok(()),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        return Err(Disconnected);
                    }
                },
                _ = self.heartbeat.tick() => self.ping().await?,
            }
        }
    }

    async fn handle_text(&mut self, text: &str) -> Result<(), Disconnected> {
        match parse_frame(text) {
            Ok(ClientMessage::Ping) => self.send(ServerMessage::pong()).await,
            Ok(ClientMessage::Open { url }) => self.launch(url.unwrap_or_default()).await,
            Err(reply) => self.send(reply).await,
        }
    }

    /// Frames that arrive while a launch is streaming. Only `open` is refused.
    async fn handle_text_while_busy(&mut self, text: &str) -> Result<(), Disconnected> {
        match parse_frame(text) {
            Ok(ClientMessage::Ping) => self.send(ServerMessage::pong()).await,
            Ok(ClientMessage::Open { .. }) => self.send(ServerMessage::protocol_error(BUSY)).await,
            Err(reply) => self.send(reply).await,
        }
    }

    async fn launch(&mut self, raw_url: String) -> Result<(), Disconnected> {
        let raw_url = raw_url.trim();
        self.send(ServerMessage::log(format!("Received URL: {}", raw_url)))
            .await?;

        let request = match validator::validate(raw_url) {
            Ok(request) => request,
            Err(e) => {
                info!("Rejected URL {:?}: {}", raw_url, e);
                return self.send(ServerMessage::from(&e)).await;
            }
        };

        self.send(ServerMessage::log(format!(
            "Video ID: {}",
            request.video_id()
        )))
        .await?;

        let argv = self.bridge.command_line(&request);
        let argv_json = serde_json::to_string(&argv).unwrap_or_else(|_| argv.join(" "));
        self.send(ServerMessage::log(format!("Command executed: {}", argv_json)))
            .await?;

        let mut process = match self.bridge.spawn(&request) {
            Ok(process) => process,
            Err(e) => {
                error!("Could not start launch: {}", e);
                return self.send(ServerMessage::from(&e)).await;
            }
        };

        loop {
            tokio::select! {
                line = process.next_line() => match line {
                    Some(line) => {
                        self.send(ServerMessage::log(format!(
                            "[{}] {}",
                            line.source.label(),
                            line.text
                        )))
                        .await?
                    }
                    None => break,
                },
                incoming = self.rx.next() => match incoming {
                    Some(Ok(Message::Text(text))) => self.handle_text_while_busy(text.as_str()).await?,
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Client left during launch, stopping process");
                        return Err(Disconnected);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("WebSocket error during launch: {}", e);
                        return Err(Disconnected);
                    }
                },
                _ = self.heartbeat.tick() => self.ping().await?,
            }
        }

        match process.finish().await {
            Ok(code) => {
                info!("✅ Launched video {}", request.video_id());
                self.send(ServerMessage::done(code)).await
            }
            Err(e) => self.send(ServerMessage::from(&e)).await,
        }
    }

    async fn ping(&mut self) -> Result<(), Disconnected> {
        self.tx
            .send(Message::Ping(Default::default()))
            .await
            .map_err(|_| Disconnected)
    }

    async fn send(&mut self, message: ServerMessage) -> Result<(), Disconnected> {
        if message.is_terminal() {
            debug!("Terminal message: {:?}", message);
        }

        let text = serde_json::to_string(&message).map_err(|e| {
            error!("Failed to encode {:?}: {}", message, e);
            Disconnected
        })?;

        self.tx
            .send(Message::Text(text.into()))
            .await
            .map_err(|_| Disconnected)
    }
}

/// Decodes a client frame, or returns the protocol error to send back.
fn parse_frame(text: &str) -> Result<ClientMessage, ServerMessage> {
    let value: Value = serde_json::from_str(text).map_err(|e| {
        debug!("Rejecting non-JSON frame: {}", e);
        ServerMessage::protocol_error(JSON_HINT)
    })?;

    let typ = value.get("type").cloned().unwrap_or(Value::Null);

    serde_json::from_value::<ClientMessage>(value).map_err(|e| {
        let message = match typ.as_str() {
            Some(known @ ("open" | "ping")) => format!("Malformed {} message: {}", known, e),
            _ => format!("Unknown type: {}", typ),
        };
        ServerMessage::protocol_error(message)
    })
}
