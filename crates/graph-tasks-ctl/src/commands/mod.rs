//! Command handlers for the graph-tasks CLI
//!
//! `generate` works offline; the other groups delegate to `graph-tasks-sdk`
//! over a [`graph_tasks_client::TaskApi`].

pub(crate) mod convert;
pub(crate) mod find;
pub(crate) mod generate;
pub(crate) mod lists;

pub(crate) use convert::handle_convert_command;
pub(crate) use find::handle_find_command;
pub(crate) use generate::handle_generate_command;
pub(crate) use lists::handle_lists_command;
