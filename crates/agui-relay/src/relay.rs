use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::StreamExt as _;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::agent;
use crate::event::ChatEvent;
use crate::provider::{ChatMessage, CompletionRequest, ProviderAdapter, UpstreamDelta};
use crate::turn::{Finalization, ToolCallOutcome, TurnState};

/// Bounded event buffer between the relay task and the consumer.
const EVENT_BUFFER_CAPACITY: usize = 128;

/// One inbound chat turn: the new user message plus prior history.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

/// Streaming handle returned by `stream_chat`.
///
/// Yields events until the relay task closes the channel; every poll after
/// that reports the end of the stream. Dropping the handle cancels the turn.
pub struct ChatStream {
    rx: mpsc::Receiver<ChatEvent>,
}

impl ChatStream {
    /// Waits for and returns the next event.
    ///
    /// Returns `None` once the turn has closed.
    pub async fn next_event(&mut self) -> Option<ChatEvent> {
        self.rx.recv().await
    }

    /// Drains the stream and returns every remaining event in order.
    pub async fn collect_events(mut self) -> Vec<ChatEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.rx.recv().await {
            events.push(event);
        }
        events
    }
}

impl futures::Stream for ChatStream {
    type Item = ChatEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

/// Starts one relay turn against `provider` and returns the event stream.
///
/// The provider handle is passed in explicitly; nothing here reads ambient
/// state. One task is spawned per call, so this must run inside a tokio
/// runtime. The task exits when the upstream stream ends, the upstream
/// fails, or the consumer goes away.
pub fn stream_chat(provider: Arc<dyn ProviderAdapter>, request: ChatRequest) -> ChatStream {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER_CAPACITY);
    tokio::spawn(relay_task(provider, request, tx));
    ChatStream { rx }
}

async fn relay_task(
    provider: Arc<dyn ProviderAdapter>,
    request: ChatRequest,
    tx: mpsc::Sender<ChatEvent>,
) {
    let turn_id = uuid::Uuid::new_v4();
    let provider_id = provider.id();

    if !send_event(&tx, ChatEvent::thinking()).await {
        debug!(turn_id = %turn_id, "consumer went away before the turn started");
        return;
    }

    let completion = CompletionRequest {
        turn_id,
        system_prompt: agent::SYSTEM_PROMPT.to_string(),
        history: request.history,
        message: request.message,
        tools: vec![agent::generate_ui_tool()],
    };

    let mut deltas = match provider.start_stream(completion).await {
        Ok(stream) => stream,
        Err(err) => {
            error!(
                turn_id = %turn_id,
                provider = %provider_id,
                error = %err,
                "upstream stream failed to open"
            );
            let _ = send_event(&tx, ChatEvent::Error(err.message().to_string())).await;
            return;
        }
    };

    let mut turn = TurnState::new();
    loop {
        tokio::select! {
            _ = tx.closed() => {
                debug!(
                    turn_id = %turn_id,
                    provider = %provider_id,
                    "consumer disconnected, dropping upstream stream"
                );
                return;
            }
            next = deltas.next() => {
                match next {
                    Some(Ok(UpstreamDelta::Text { text })) => {
                        if text.is_empty() {
                            continue;
                        }
                        debug!(turn_id = %turn_id, len = text.len(), "text fragment");
                        if !send_event(&tx, ChatEvent::Text(text)).await {
                            return;
                        }
                    }
                    Some(Ok(UpstreamDelta::ToolCall { delta })) => {
                        match turn.absorb(delta) {
                            ToolCallOutcome::Opened => {
                                debug!(turn_id = %turn_id, "tool invocation opened");
                                if !send_event(&tx, ChatEvent::generating_ui()).await {
                                    return;
                                }
                            }
                            ToolCallOutcome::Appended | ToolCallOutcome::Ignored => {}
                        }
                    }
                    Some(Err(err)) => {
                        error!(
                            turn_id = %turn_id,
                            provider = %provider_id,
                            error = %err,
                            "upstream stream failed"
                        );
                        let _ = send_event(&tx, ChatEvent::Error(err.message().to_string())).await;
                        return;
                    }
                    None => {
                        finalize_turn(&tx, turn_id, turn).await;
                        return;
                    }
                }
            }
        }
    }
}

/// Emits the terminal events for a naturally exhausted upstream stream.
///
/// A malformed argument buffer is a fallback text notice, never an `error`
/// event; `error` is reserved for upstream failures.
async fn finalize_turn(tx: &mpsc::Sender<ChatEvent>, turn_id: uuid::Uuid, turn: TurnState) {
    match turn.finalize() {
        Finalization::NoInvocation | Finalization::UnrecognizedTool => {}
        Finalization::Component(component) => {
            debug!(turn_id = %turn_id, component = %component.component, "component ready");
            let confirmation = format!("\n\nI've generated a {} for you.", component.component);
            if send_event(tx, ChatEvent::Ui(component)).await {
                let _ = send_event(tx, ChatEvent::Text(confirmation)).await;
            }
        }
        Finalization::Malformed => {
            let _ = send_event(tx, ChatEvent::Text("\n(Error generating UI)".to_string())).await;
        }
    }
}

async fn send_event(tx: &mpsc::Sender<ChatEvent>, event: ChatEvent) -> bool {
    tx.send(event).await.is_ok()
}
