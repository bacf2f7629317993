//! Story state error types.

/// Specific error conditions for turn history operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StoryErrorKind {
    /// Turn index does not exist in the history
    #[display("Turn {} is out of range (history has {} turns)", index, len)]
    TurnOutOfRange {
        /// Requested index
        index: usize,
        /// History length
        len: usize,
    },
    /// Operation requires an AI turn
    #[display("Turn {} is not an AI turn", _0)]
    NotAiTurn(usize),
    /// Operation requires a player turn
    #[display("Turn {} is not a player turn", _0)]
    NotPlayerTurn(usize),
    /// Per-story worker could not be reached
    #[display("Story worker unavailable: {}", _0)]
    ActorUnavailable(String),
}

/// Error type for story state operations.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{StoryError, StoryErrorKind};
///
/// let err = StoryError::new(StoryErrorKind::NotAiTurn(2));
/// assert!(format!("{}", err).contains("not an AI turn"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Story Error: {} at line {} in {}", kind, line, file)]
pub struct StoryError {
    /// The specific error condition
    pub kind: StoryErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl StoryError {
    /// Create a new StoryError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
