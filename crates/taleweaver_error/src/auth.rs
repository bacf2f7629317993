//! Authentication error types.

/// Authentication failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum AuthErrorKind {
    /// No credential was supplied with the request
    #[display("Missing credential")]
    MissingCredential,
    /// The supplied credential is not recognized
    #[display("Invalid credential")]
    InvalidCredential,
}

/// Authentication error with location tracking.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{AuthError, AuthErrorKind};
///
/// let err = AuthError::new(AuthErrorKind::MissingCredential);
/// assert!(format!("{}", err).contains("Missing credential"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Auth Error: {} at line {} in {}", kind, line, file)]
pub struct AuthError {
    /// The specific error condition
    pub kind: AuthErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl AuthError {
    /// Create a new AuthError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: AuthErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
