//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// Role of a message sent to the completion collaborator.
///
/// # Examples
///
/// ```
/// use taleweaver_core::Role;
///
/// assert_ne!(Role::User, Role::Assistant);
/// assert_eq!(format!("{}", Role::System), "system");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions framing the model
    #[display("system")]
    System,
    /// Player input
    #[display("user")]
    User,
    /// Model output
    #[display("assistant")]
    Assistant,
}
