use tracing::warn;

use crate::agent::GENERATE_UI_TOOL;
use crate::event::UiComponent;
use crate::provider::ToolCallDelta;

/// Accumulated state of the one tool invocation accepted for a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingToolCall {
    pub id: String,
    pub name: String,
    pub slot: u32,
    /// Opaque argument buffer, appended in arrival order and parsed only at
    /// finalization.
    pub arguments: String,
}

/// Result of folding one tool-call fragment into the turn.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ToolCallOutcome {
    /// A new invocation was accepted; announce it downstream.
    Opened,
    /// A fragment was appended to the accepted invocation.
    Appended,
    /// The fragment had nowhere to go and was dropped.
    Ignored,
}

/// Result of finalizing the turn once the upstream stream is exhausted.
#[derive(Debug, PartialEq)]
pub(crate) enum Finalization {
    /// No invocation was opened during the turn.
    NoInvocation,
    /// The accepted invocation parsed into a renderable component.
    Component(UiComponent),
    /// The accepted invocation carried a name the agent never advertised.
    UnrecognizedTool,
    /// The argument buffer did not form a component payload.
    Malformed,
}

/// Per-turn invocation state owned exclusively by the relay task.
///
/// At most one invocation is accepted per turn; a competing invocation
/// opened while one is pending is dropped, and its argument fragments are
/// kept out of the accepted buffer by slot attribution.
#[derive(Debug, Default)]
pub(crate) struct TurnState {
    pending: Option<PendingToolCall>,
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one tool-call fragment into the turn.
    pub fn absorb(&mut self, delta: ToolCallDelta) -> ToolCallOutcome {
        match &mut self.pending {
            None => {
                let Some(id) = delta.id else {
                    warn!(
                        slot = delta.slot,
                        "dropping argument fragment before any invocation opened"
                    );
                    return ToolCallOutcome::Ignored;
                };
                let mut call = PendingToolCall {
                    id,
                    name: delta.name.unwrap_or_default(),
                    slot: delta.slot,
                    arguments: String::new(),
                };
                if let Some(fragment) = delta.arguments {
                    call.arguments.push_str(&fragment);
                }
                self.pending = Some(call);
                ToolCallOutcome::Opened
            }
            Some(call) => {
                if delta.slot != call.slot {
                    warn!(
                        slot = delta.slot,
                        accepted_slot = call.slot,
                        accepted_id = %call.id,
                        "ignoring fragment for a competing invocation"
                    );
                    return ToolCallOutcome::Ignored;
                }
                // Some providers send the name on a later fragment than the id.
                if let Some(name) = delta.name
                    && call.name.is_empty()
                {
                    call.name = name;
                }
                if let Some(fragment) = delta.arguments {
                    call.arguments.push_str(&fragment);
                }
                ToolCallOutcome::Appended
            }
        }
    }

    /// Consumes the turn and parses the accepted invocation, if any.
    ///
    /// This is the only place the argument buffer is interpreted.
    pub fn finalize(self) -> Finalization {
        let Some(call) = self.pending else {
            return Finalization::NoInvocation;
        };
        if call.name != GENERATE_UI_TOOL {
            warn!(
                id = %call.id,
                name = %call.name,
                "stream ended with an unrecognized tool invocation"
            );
            return Finalization::UnrecognizedTool;
        }
        match serde_json::from_str::<UiComponent>(&call.arguments) {
            Ok(component) => Finalization::Component(component),
            Err(err) => {
                warn!(
                    id = %call.id,
                    error = %err,
                    "tool arguments did not form a component payload"
                );
                Finalization::Malformed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn open(slot: u32, id: &str, name: &str) -> ToolCallDelta {
        ToolCallDelta {
            slot,
            id: Some(id.into()),
            name: Some(name.into()),
            arguments: None,
        }
    }

    fn args(slot: u32, fragment: &str) -> ToolCallDelta {
        ToolCallDelta {
            slot,
            arguments: Some(fragment.into()),
            ..ToolCallDelta::default()
        }
    }

    #[test]
    fn opening_fragment_creates_the_pending_call() {
        let mut turn = TurnState::new();
        assert_eq!(
            turn.absorb(open(0, "call_1", GENERATE_UI_TOOL)),
            ToolCallOutcome::Opened
        );
        assert_eq!(turn.absorb(args(0, "{\"a\":")), ToolCallOutcome::Appended);
    }

    #[test]
    fn buffer_is_the_concatenation_of_fragments_in_arrival_order() {
        let mut turn = TurnState::new();
        turn.absorb(open(0, "call_1", GENERATE_UI_TOOL));
        turn.absorb(args(0, "{\"component\":\"Wea"));
        turn.absorb(args(0, "therCard\",\"props\":{\"city\":\"Paris\"}}"));
        let Finalization::Component(component) = turn.finalize() else {
            panic!("expected a parsed component");
        };
        assert_eq!(component.component, "WeatherCard");
        assert_eq!(component.props, json!({"city": "Paris"}));
    }

    #[test]
    fn opening_fragment_may_carry_the_first_argument_chunk() {
        let mut turn = TurnState::new();
        turn.absorb(ToolCallDelta {
            slot: 0,
            id: Some("call_1".into()),
            name: Some(GENERATE_UI_TOOL.into()),
            arguments: Some("{\"component\":\"TodoList\",".into()),
        });
        turn.absorb(args(0, "\"props\":{}}"));
        let Finalization::Component(component) = turn.finalize() else {
            panic!("expected a parsed component");
        };
        assert_eq!(component.component, "TodoList");
    }

    #[test]
    fn name_arriving_after_the_id_is_filled_in_once() {
        let mut turn = TurnState::new();
        turn.absorb(ToolCallDelta {
            slot: 0,
            id: Some("call_1".into()),
            name: None,
            arguments: None,
        });
        turn.absorb(ToolCallDelta {
            slot: 0,
            name: Some(GENERATE_UI_TOOL.into()),
            ..ToolCallDelta::default()
        });
        turn.absorb(ToolCallDelta {
            slot: 0,
            name: Some("something_else".into()),
            arguments: Some("{\"component\":\"LoginForm\",\"props\":{}}".into()),
            ..ToolCallDelta::default()
        });
        let Finalization::Component(component) = turn.finalize() else {
            panic!("expected a parsed component");
        };
        assert_eq!(component.component, "LoginForm");
    }

    #[test]
    fn competing_invocation_is_ignored_and_does_not_corrupt_the_buffer() {
        let mut turn = TurnState::new();
        turn.absorb(open(0, "call_1", GENERATE_UI_TOOL));
        turn.absorb(args(0, "{\"component\":\"StockChart\","));
        assert_eq!(
            turn.absorb(open(1, "call_2", GENERATE_UI_TOOL)),
            ToolCallOutcome::Ignored
        );
        assert_eq!(
            turn.absorb(args(1, "{\"component\":\"LoginForm\"")),
            ToolCallOutcome::Ignored
        );
        turn.absorb(args(0, "\"props\":{\"symbol\":\"ACME\"}}"));
        let Finalization::Component(component) = turn.finalize() else {
            panic!("expected a parsed component");
        };
        assert_eq!(component.component, "StockChart");
        assert_eq!(component.props, json!({"symbol": "ACME"}));
    }

    #[test]
    fn argument_fragment_before_any_invocation_is_dropped() {
        let mut turn = TurnState::new();
        assert_eq!(turn.absorb(args(0, "{\"x\":1}")), ToolCallOutcome::Ignored);
        assert_eq!(turn.finalize(), Finalization::NoInvocation);
    }

    #[test]
    fn finalize_without_invocation_is_a_no_op() {
        assert_eq!(TurnState::new().finalize(), Finalization::NoInvocation);
    }

    #[test]
    fn truncated_buffer_finalizes_as_malformed() {
        let mut turn = TurnState::new();
        turn.absorb(open(0, "call_1", GENERATE_UI_TOOL));
        turn.absorb(args(0, "{\"component\":\"WeatherCard\",\"props\":{\"ci"));
        assert_eq!(turn.finalize(), Finalization::Malformed);
    }

    #[test]
    fn missing_props_finalizes_as_malformed() {
        let mut turn = TurnState::new();
        turn.absorb(open(0, "call_1", GENERATE_UI_TOOL));
        turn.absorb(args(0, "{\"component\":\"WeatherCard\"}"));
        assert_eq!(turn.finalize(), Finalization::Malformed);
    }

    #[test]
    fn unrecognized_tool_name_is_gated_out_at_finalization() {
        let mut turn = TurnState::new();
        turn.absorb(open(0, "call_1", "fetch_weather"));
        turn.absorb(args(0, "{\"city\":\"Paris\"}"));
        assert_eq!(turn.finalize(), Finalization::UnrecognizedTool);
    }
}
