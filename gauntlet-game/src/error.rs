//! Error types for game progress and persistence.

use gauntlet_judge::Level;

/// Local persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Underlying I/O failed
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value is not valid for its key
    #[error("Corrupt value under {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// Value could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key is not usable by this store
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Rejected game actions.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// No idea has been registered yet
    #[error("No game in progress")]
    NoGame,

    /// An idea is already registered; reset first
    #[error("A game is already in progress")]
    GameInProgress,

    /// Idea name or description blank
    #[error("Idea name and description are required")]
    EmptyIdea,

    /// Submission blank after trimming
    #[error("Submission is empty")]
    EmptySubmission,

    /// Level needs the unlock
    #[error("Level {0} is locked until the gauntlet is unlocked")]
    Paywalled(Level),

    /// Previous level not yet passed
    #[error("Level {0} requires passing the previous level first")]
    PreviousLevelIncomplete(Level),

    /// Level already passed; input is closed
    #[error("Level {0} is already passed")]
    AlreadyPassed(Level),

    /// A judging call for this level is still outstanding
    #[error("Level {0} is already being judged")]
    AlreadyJudging(Level),

    /// The game changed while a judgment was in flight
    #[error("Game was reset while level {0} was being judged")]
    Superseded(Level),

    /// Report requires all five levels passed
    #[error("Report requires all levels passed ({passed}/5 so far)")]
    Incomplete { passed: usize },

    /// Persistence failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}
