use crate::provider::ToolSpec;

/// Name of the single tool the agent advertises.
pub const GENERATE_UI_TOOL: &str = "generate_ui";

/// Components the `generate_ui` tool may produce.
pub const UI_COMPONENTS: [&str; 4] = ["WeatherCard", "StockChart", "TodoList", "LoginForm"];

/// System prompt installed for every turn.
pub const SYSTEM_PROMPT: &str = "You are an AG-UI compatible agent. You can answer questions or generate UI components. When the user asks for a specific interface or data visualization, use the 'generate_ui' tool. If the user asks 'what is ag-ui', explain it briefly and offer to show a demo.";

/// Builds the `generate_ui` tool spec advertised to the model.
pub fn generate_ui_tool() -> ToolSpec {
    ToolSpec {
        name: GENERATE_UI_TOOL.to_string(),
        description: "Generate a UI component for the user.".to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "component": {
                    "type": "string",
                    "enum": UI_COMPONENTS,
                    "description": "The type of component to render"
                },
                "props": {
                    "type": "object",
                    "description": "The props for the component"
                }
            },
            "required": ["component", "props"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_spec_requires_component_and_props() {
        let tool = generate_ui_tool();
        assert_eq!(tool.name, GENERATE_UI_TOOL);
        let required = tool
            .parameters
            .get("required")
            .and_then(|v| v.as_array())
            .expect("required list");
        assert_eq!(required.len(), 2);
        let components = tool
            .parameters
            .pointer("/properties/component/enum")
            .and_then(|v| v.as_array())
            .expect("component enum");
        assert_eq!(components.len(), UI_COMPONENTS.len());
    }
}
