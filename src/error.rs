// Error taxonomy for failures that cross module boundaries
//
// Strategy runtime failures and illegal moves are not errors: the invocation adapter
// corrects them in place and reports them as `FallbackReason` values.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GauntletError {
    /// Strategy source missing, unparsable, or naming no known decision function
    #[error("failed to load strategy: {0}")]
    StrategyLoad(String),

    /// Leaderboard or archive write failed
    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("no opponent available for the gauntlet")]
    NoOpponentAvailable,

    #[error("challenger unavailable: {0}")]
    ChallengerUnavailable(String),

    #[error("cannot place two snakes of length {length} on a {width}x{height} grid")]
    Placement {
        width: i32,
        height: i32,
        length: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GauntletError>;
