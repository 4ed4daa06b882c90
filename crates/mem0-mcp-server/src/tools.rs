//! MCP tool definitions following the MCP 2024-11-05 protocol specification.
//!
//! This module defines the tools available through the server's `tools/list`
//! and `tools/call` endpoints.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Project-level extraction instructions pushed to mem0 at startup.
///
/// These guide what the memory service extracts from stored messages.
pub const CUSTOM_INSTRUCTIONS: &str = "\
Extract the Following Information:

- Code Snippets: Save the actual code for future reference.
- Explanation: Document a clear description of what the code does and how it works.
- Related Technical Details: Include information about the programming language, dependencies, and system specifications.
- Key Features: Highlight the main functionalities and important aspects of the snippet.
- Project Context: Note which project the preference belongs to when provided.";

/// Project used when a tool call does not name one.
pub const DEFAULT_PROJECT: &str = "default_project";

/// MCP tool definition following the protocol specification.
///
/// Each tool has a name, description, and JSON Schema for input validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name
    pub name: String,

    /// Human-readable description of what the tool does
    pub description: String,

    /// JSON Schema defining the tool's input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new tool definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Tool name constants used by the call dispatcher.
pub mod tool_names {
    pub const ADD_CODING_PREFERENCE: &str = "add_coding_preference";
    pub const GET_ALL_CODING_PREFERENCES: &str = "get_all_coding_preferences";
    pub const SEARCH_CODING_PREFERENCES: &str = "search_coding_preferences";
}

/// Get all tool definitions for the `tools/list` response.
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            tool_names::ADD_CODING_PREFERENCE,
            "Add a new coding preference to mem0, tagged with a project. This tool stores \
             code snippets, implementation details, and coding patterns for future reference. \
             When storing code, include complete code with imports and dependencies, \
             language and version information, setup instructions if needed, and a clear \
             description of what the code does. The preference is scoped to the given \
             project so it can be retrieved per project later.",
            json!({
                "type": "object",
                "properties": {
                    "text": {
                        "type": "string",
                        "description": "The coding preference content to store, including code and context"
                    },
                    "project": {
                        "type": "string",
                        "default": DEFAULT_PROJECT,
                        "description": "Project name used to tag and scope this preference"
                    },
                    "enable_graph": {
                        "type": "boolean",
                        "description": "Enable graph processing for this preference (overrides the server default)"
                    }
                },
                "required": ["text"]
            }),
        ),
        ToolDefinition::new(
            tool_names::GET_ALL_CODING_PREFERENCES,
            "Get all coding preferences stored for a project. Call this tool when you need \
             the complete context of previously stored preferences for the project, for \
             example before suggesting an implementation approach. Returns a JSON list of \
             preferences with their content and metadata.",
            json!({
                "type": "object",
                "properties": {
                    "project": {
                        "type": "string",
                        "default": DEFAULT_PROJECT,
                        "description": "Project name whose preferences should be returned"
                    }
                },
                "required": []
            }),
        ),
        ToolDefinition::new(
            tool_names::SEARCH_CODING_PREFERENCES,
            "Search stored coding preferences using semantic search, scoped to a project. \
             The search covers code snippets, implementation patterns, dependency and setup \
             information, and technical documentation. Results are ranked by relevance to \
             the query.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query text"
                    },
                    "project": {
                        "type": "string",
                        "default": DEFAULT_PROJECT,
                        "description": "Project name to scope the search to"
                    },
                    "enable_graph": {
                        "type": "boolean",
                        "description": "Enable graph-augmented search (overrides the server default)"
                    }
                },
                "required": ["query"]
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_tools_defined() {
        let tools = get_tool_definitions();
        assert_eq!(tools.len(), 3);

        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert!(names.contains(&tool_names::ADD_CODING_PREFERENCE));
        assert!(names.contains(&tool_names::GET_ALL_CODING_PREFERENCES));
        assert!(names.contains(&tool_names::SEARCH_CODING_PREFERENCES));
    }

    #[test]
    fn test_schemas_declare_required_params() {
        let tools = get_tool_definitions();

        let add = tools
            .iter()
            .find(|t| t.name == tool_names::ADD_CODING_PREFERENCE)
            .unwrap();
        assert_eq!(add.input_schema["required"], json!(["text"]));

        let search = tools
            .iter()
            .find(|t| t.name == tool_names::SEARCH_CODING_PREFERENCES)
            .unwrap();
        assert_eq!(search.input_schema["required"], json!(["query"]));
    }

    #[test]
    fn test_input_schema_serializes_camel_case() {
        let tools = get_tool_definitions();
        let json = serde_json::to_value(&tools[0]).unwrap();
        assert!(json.get("inputSchema").is_some());
    }
}
