//! Shared SDK for graph-tasks: Planner → To-Do conversion, task search, and client generation.
//!
//! This crate holds the logic consumed by both `graph-tasks-ctl` (CLI) and
//! `graph-tasks-mcp` (MCP server). Remote calls go through
//! [`graph_tasks_client::TaskApi`], so everything here runs against the live
//! Graph client or the in-memory fake alike.
//!
//! # Modules
//!
//! - [`mapping`]: Pure Planner → To-Do field mapping
//! - [`conversion`]: `TaskConverter`: the copy-and-complete workflow
//! - [`search`]: `TaskFinder`: keyword search across prioritized lists
//! - [`responses`]: Compact projections shared by MCP and CLI output
//! - [`codegen`]: Build-time client generator and its source patches

pub mod codegen;
pub mod conversion;
pub mod mapping;
pub mod responses;
pub mod search;

pub use conversion::{ConversionReport, ConversionRequest, SourceCompletion, TaskConverter};
pub use search::{FindOutcome, FindRequest, TaskFinder};
