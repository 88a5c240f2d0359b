use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid rank ladder: {0}")]
    InvalidRankLadder(String),

    #[error("Unknown challenge type: {0}")]
    UnknownChallengeType(String),

    #[error("Unknown share status: {0}")]
    UnknownShareStatus(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
