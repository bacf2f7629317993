//! Request body decoding errors.

/// Why a JSON request body was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum JsonErrorKind {
    /// The body is not well-formed JSON
    #[display("Malformed JSON body: {}", _0)]
    Syntax(String),
    /// Well-formed JSON that does not fit the expected shape
    #[display("Invalid request body: {}", _0)]
    Data(String),
    /// The request did not declare `application/json`
    #[display("Expected request with `Content-Type: application/json`")]
    MissingContentType,
    /// The body could not be read at all
    #[display("Unreadable request body: {}", _0)]
    Body(String),
}

/// Request body error with location tracking.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{JsonError, JsonErrorKind};
///
/// let err = JsonError::new(JsonErrorKind::Data("unknown variant `sideways`".into()));
/// assert!(err.kind.to_string().contains("sideways"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error: {} at line {} in {}", kind, line, file)]
pub struct JsonError {
    /// The specific error condition
    pub kind: JsonErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl JsonError {
    /// Create a new JsonError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: JsonErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
