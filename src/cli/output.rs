//! output formatting utilities for scriptable CLI output
//!
//! uses JSON-RPC 2.0 format for machine-readable output:
//! - success: {"jsonrpc": "2.0", "result": {...}, "id": null}
//! - error: {"jsonrpc": "2.0", "error": {"code": N, "message": "...", "data": {...}}, "id": null}

use serde::Serialize;

use crate::conditions::{ConditionEntry, ConditionSet};

const JSONRPC_VERSION: &str = "2.0";

/// output mode determines how results are formatted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// human-readable text output
    Text,
    /// machine-readable JSON-RPC 2.0 output
    Json,
    /// no output on success (errors still go to stderr)
    Quiet,
}

impl OutputMode {
    /// priority: quiet > json > text
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if json {
            Self::Json
        } else {
            Self::Text
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }
}

/// JSON-RPC 2.0 success response
#[derive(Serialize)]
pub struct JsonRpcResponse<T: Serialize> {
    pub jsonrpc: &'static str,
    pub result: T,
    /// null for CLI responses (no request id)
    pub id: Option<String>,
}

impl<T: Serialize> JsonRpcResponse<T> {
    pub fn new(result: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result,
            id: None,
        }
    }
}

/// JSON-RPC 2.0 error response
#[derive(Serialize)]
pub struct JsonRpcError {
    pub jsonrpc: &'static str,
    pub error: RpcError,
    pub id: Option<String>,
}

#[derive(Serialize)]
pub struct RpcError {
    /// radial exit code offset by -32000
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ErrorData>,
}

#[derive(Serialize)]
pub struct ErrorData {
    pub suggestions: Vec<String>,
}

impl JsonRpcError {
    pub fn with_suggestions(
        code: i32,
        message: impl Into<String>,
        suggestions: Vec<String>,
    ) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            error: RpcError {
                code: to_jsonrpc_code(code),
                message: message.into(),
                data: if suggestions.is_empty() {
                    None
                } else {
                    Some(ErrorData { suggestions })
                },
            },
            id: None,
        }
    }
}

/// JSON-RPC reserves -32000 to -32099 for application errors
fn to_jsonrpc_code(exit_code: i32) -> i32 {
    -32000 - exit_code
}

// ============================================================================
// Result data structures
// ============================================================================

#[derive(Serialize, Debug, PartialEq)]
pub struct EntryData {
    pub id: u32,
    pub kind: &'static str,
    pub negate: bool,
    pub op: String,
    pub open_group: bool,
    pub close_group: bool,
    pub text: String,
}

impl From<&ConditionEntry> for EntryData {
    fn from(entry: &ConditionEntry) -> Self {
        let condition = entry.condition();
        let op = entry.op();
        Self {
            id: condition.id(),
            kind: condition.nickname(),
            negate: condition.negate(),
            op: op.op.to_string(),
            open_group: op.open_group,
            close_group: op.close_group,
            text: condition.to_string(),
        }
    }
}

#[derive(Serialize, Debug, PartialEq)]
pub struct SetData {
    pub category: String,
    pub expression: String,
    pub valid: bool,
    pub entries: Vec<EntryData>,
}

impl From<&ConditionSet> for SetData {
    fn from(set: &ConditionSet) -> Self {
        Self {
            category: set.category().to_string(),
            expression: set.to_string(),
            valid: set.validate().is_ok(),
            entries: set.entries().iter().map(EntryData::from).collect(),
        }
    }
}

/// one row of `radial list`
#[derive(Serialize)]
pub struct ListItem {
    pub category: String,
    pub count: usize,
    pub expression: String,
}

#[derive(Serialize)]
pub struct ListResponse<T: Serialize> {
    pub items: Vec<T>,
}

/// result of an edit command
#[derive(Serialize)]
pub struct EditData {
    pub action: &'static str,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub expression: String,
    pub conflicts_with: Vec<String>,
}

#[derive(Serialize)]
pub struct EvalData {
    pub category: String,
    pub passes: bool,
    pub expression: String,
}

/// two rule sets that can never be active together
#[derive(Serialize)]
pub struct ConflictData {
    pub first: String,
    pub second: String,
    /// pairs of mutually exclusive conditions, rendered as text
    pub reasons: Vec<(String, String)>,
}

#[derive(Serialize)]
pub struct CheckData {
    pub category: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct PathData {
    pub path: String,
    pub exists: bool,
}

// ============================================================================
// Output functions
// ============================================================================

/// print JSON-RPC success response to stdout
pub fn print_json<T: Serialize>(data: &T) {
    let response = JsonRpcResponse::new(data);
    if let Ok(json) = serde_json::to_string(&response) {
        println!("{}", json);
    }
}

/// print JSON-RPC error with optional suggestions to stdout
pub fn print_json_error(code: i32, message: &str, suggestions: Vec<String>) {
    let error = JsonRpcError::with_suggestions(code, message, suggestions);
    if let Ok(json) = serde_json::to_string(&error) {
        println!("{}", json);
    }
}
