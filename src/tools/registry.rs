//! Static tool descriptors advertised to MCP clients.

use std::sync::Arc;

use rmcp::model::{JsonObject, Tool};
use serde_json::{Value, json};

pub const WHISPER_TRANSCRIBE: &str = "whisper_transcribe";
pub const SHELL_COMMAND: &str = "shell_command";

/// Name, description and JSON input schema of one tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: JsonObject,
}

impl ToolDescriptor {
    /// Names listed under the schema's `required` key.
    #[must_use]
    pub fn required(&self) -> Vec<&str> {
        self.input_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

impl From<ToolDescriptor> for Tool {
    fn from(descriptor: ToolDescriptor) -> Self {
        Tool::new(
            descriptor.name,
            descriptor.description,
            Arc::new(descriptor.input_schema),
        )
    }
}

/// The tools this server exposes, in advertised order.
#[must_use]
pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: WHISPER_TRANSCRIBE,
            description: "Transcribe audio files using whisper-cli",
            input_schema: schema(json!({
                "type": "object",
                "properties": {
                    "audio_file": {
                        "type": "string",
                        "description": "Path to the audio file to transcribe"
                    },
                    "model": {
                        "type": "string",
                        "description": "Whisper model to use (base, small, medium, large, large-v2, large-v3)",
                        "default": "base"
                    },
                    "language": {
                        "type": "string",
                        "description": "Language code for transcription (optional, auto-detect if not provided)"
                    },
                    "output_format": {
                        "type": "string",
                        "description": "Output format (txt, vtt, srt, json)",
                        "default": "txt"
                    }
                },
                "required": ["audio_file"]
            })),
        },
        ToolDescriptor {
            name: SHELL_COMMAND,
            description: "Execute shell commands safely",
            input_schema: schema(json!({
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "description": "Shell command to execute"
                    },
                    "working_directory": {
                        "type": "string",
                        "description": "Working directory for the command (optional)"
                    }
                },
                "required": ["command"]
            })),
        },
    ]
}

fn schema(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_tools_in_order() {
        let names: Vec<_> = tools().iter().map(|t| t.name).collect();
        assert_eq!(names, [WHISPER_TRANSCRIBE, SHELL_COMMAND]);
    }

    #[test]
    fn test_required_parameters() {
        let tools = tools();
        assert_eq!(tools[0].required(), ["audio_file"]);
        assert_eq!(tools[1].required(), ["command"]);
    }

    #[test]
    fn test_whisper_defaults() {
        let tools = tools();
        let properties = tools[0].input_schema["properties"].clone();
        assert_eq!(properties["model"]["default"], "base");
        assert_eq!(properties["output_format"]["default"], "txt");
        assert!(properties["language"].get("default").is_none());
    }

    #[test]
    fn test_converts_to_protocol_tool() {
        let tool: Tool = tools().remove(1).into();
        assert_eq!(tool.name, SHELL_COMMAND);
        assert_eq!(tool.input_schema["type"], "object");
    }
}
