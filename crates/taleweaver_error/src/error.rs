//! Top-level error wrapper types.

use crate::{
    AuthError, BuilderError, CompletionError, ConfigError, JsonError, StorageError,
    StoryError, ValidationError,
};

/// Every error condition a Taleweaver operation can surface.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{TaleweaverError, JsonError, JsonErrorKind};
///
/// let json_err = JsonError::new(JsonErrorKind::MissingContentType);
/// let err: TaleweaverError = json_err.into();
/// assert!(format!("{}", err).contains("JSON Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TaleweaverErrorKind {
    /// Request body rejected
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// Authentication error
    #[from(AuthError)]
    Auth(AuthError),
    /// Caller input rejected
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Completion provider error
    #[from(CompletionError)]
    Completion(CompletionError),
    /// Story store error
    #[from(StorageError)]
    Storage(StorageError),
    /// Turn history error
    #[from(StoryError)]
    Story(StoryError),
}

/// Taleweaver error with kind discrimination.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{ConfigError, TaleweaverErrorKind, TaleweaverResult};
///
/// fn might_fail() -> TaleweaverResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), TaleweaverErrorKind::Config(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Taleweaver Error: {}", _0)]
pub struct TaleweaverError(Box<TaleweaverErrorKind>);

impl TaleweaverError {
    /// Create a new error from a kind.
    pub fn new(kind: TaleweaverErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TaleweaverErrorKind {
        &self.0
    }

    /// Whether the error is a transient completion failure worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self.kind() {
            TaleweaverErrorKind::Completion(e) => e.is_retryable(),
            _ => false,
        }
    }
}

// Generic From implementation for any type that converts to TaleweaverErrorKind
impl<T> From<T> for TaleweaverError
where
    T: Into<TaleweaverErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Taleweaver operations.
pub type TaleweaverResult<T> = std::result::Result<T, TaleweaverError>;
