//! graph-tasks MCP Server library.
//!
//! Provides the [`server::GraphTasksMcpServer`] MCP server handler and tool parameter/response types.
//! Used by the `graph-tasks-mcp` binary and available for integration testing.

pub mod server;
pub mod tools;
