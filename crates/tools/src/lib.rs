//! MCP tools for the dispatch server
//!
//! Four tools share one argument shape (`query`, optional `session_id` and
//! `bot_id`) and one context-resolution path:
//! - `book_appointment`, `cancel_appointment`, `reschedule_appointment`
//!   return a JSON payload with the form URL
//! - `retrieve_context` returns reranked passages as plain text
//!
//! Faults are rendered into the payload, so `isError` is always false for
//! these tools; `ToolError` is reserved for bad arguments, unknown tools
//! and timeouts.

pub mod forms;
pub mod input;
pub mod mcp;
pub mod registry;
pub mod retrieve;

pub use forms::{FormRouter, FormTool};
pub use input::{tool_input_schema, ToolArgs};
pub use mcp::{
    methods, ContentBlock, ErrorCode, InitializeResult, InputSchema, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, PropertySchema, RequestId, ServerCapabilities, ServerInfo,
    Tool, ToolCallParams, ToolCapabilities, ToolError, ToolOutput, ToolSchema, PROTOCOL_VERSION,
};
pub use registry::{create_registry, ToolExecutor, ToolRegistry};
pub use retrieve::RetrieveContextTool;
