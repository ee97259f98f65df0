use serde::{Deserialize, Serialize};

/// Activity phase reported to the client while a turn is in progress.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Thinking,
    GeneratingUi,
}

/// Progress notice payload: a phase plus a short human-readable message.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActivityUpdate {
    pub status: ActivityStatus,
    pub message: String,
}

/// A renderable component produced by the `generate_ui` tool.
///
/// `props` is carried opaquely; nothing here validates its shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UiComponent {
    pub component: String,
    pub props: serde_json::Value,
}

/// Typed event relayed to the client, in emission order.
///
/// Serializes as `{"type": ..., "data": ...}`: `text` and `error` carry a
/// bare string payload, `activity` and `ui` carry an object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Progress notice (`thinking`, `generating_ui`).
    Activity(ActivityUpdate),
    /// Verbatim assistant text fragment.
    Text(String),
    /// Completed component payload, emitted at most once per turn.
    Ui(UiComponent),
    /// Terminal upstream failure description.
    Error(String),
}

impl ChatEvent {
    /// Fixed preamble notice emitted before the upstream request is made.
    pub fn thinking() -> Self {
        Self::Activity(ActivityUpdate {
            status: ActivityStatus::Thinking,
            message: "Analyzing request...".to_string(),
        })
    }

    /// Notice emitted when the model opens a tool invocation.
    pub fn generating_ui() -> Self {
        Self::Activity(ActivityUpdate {
            status: ActivityStatus::GeneratingUi,
            message: "Generating UI component...".to_string(),
        })
    }
}
