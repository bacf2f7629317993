//! HTTP surface for the Taleweaver story engine.
//!
//! Exposes story creation, turns, regeneration, version switching, edits and
//! personas as JSON endpoints. Callers authenticate with a bearer token in
//! the `Authorization` header or a `token` field in the request body.
//!
//! # Example
//!
//! ```rust,no_run
//! use taleweaver_server::{AppState, TaleweaverConfig, create_router};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TaleweaverConfig::load(None)?;
//!     let state = AppState::from_config(&config)?;
//!
//!     let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
//!     axum::serve(listener, create_router(state)).await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod auth;
mod config;
mod error;
mod observability;
mod state;

pub use api::create_router;
pub use auth::{TokenAuthenticator, bearer_token};
pub use config::{ApiUser, ServerSettings, StorageBackend, StorageSettings, TaleweaverConfig};
pub use error::ApiError;
pub use observability::{ObservabilityConfig, init_observability};
pub use state::AppState;
