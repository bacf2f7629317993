//! Error types for Taleweaver.
//!
//! This crate provides the foundation error types used throughout the Taleweaver workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use taleweaver_error::{TaleweaverResult, ValidationError};
//!
//! fn check_action(action: &str) -> TaleweaverResult<()> {
//!     if action.trim().is_empty() {
//!         Err(ValidationError::new("Player action is required"))?
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_action("   ").is_err());
//! assert!(check_action("Open the door").is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod builder;
mod completion;
mod config;
mod error;
mod json;
mod storage;
mod story;
mod validation;

pub use auth::{AuthError, AuthErrorKind};
pub use builder::{BuilderError, BuilderErrorKind};
pub use completion::{CompletionError, CompletionErrorKind};
pub use config::ConfigError;
pub use error::{TaleweaverError, TaleweaverErrorKind, TaleweaverResult};
pub use json::{JsonError, JsonErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use story::{StoryError, StoryErrorKind};
pub use validation::ValidationError;
