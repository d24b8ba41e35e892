//! Microsoft Graph client for Planner and To-Do.
//!
//! Provides the Graph resource types, the [`TaskApi`] seam used by conversion and
//! search, and the reqwest-backed [`GraphClient`] that implements it against the
//! live API.
//!
//! # Modules
//!
//! - [`api`]: `TaskApi` trait and the `TodoTaskQuery` server-side filter
//! - [`auth`]: Bearer token sources (static token or external command)
//! - [`config`]: Config file discovery and environment overrides
//! - [`error`]: `ClientError` taxonomy and stable error codes
//! - [`graph_client`]: HTTP transport with pagination and error envelope mapping
//! - [`models`]: Planner and To-Do DTOs
//! - `testing`: In-memory `FakeTaskApi` (feature `test-utils`)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod graph_client;
pub mod models;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use api::{TaskApi, TodoTaskQuery};
pub use auth::TokenSource;
pub use config::{ClientConfig, TaskSettings};
pub use error::{ClientError, ClientResult};
pub use graph_client::GraphClient;
