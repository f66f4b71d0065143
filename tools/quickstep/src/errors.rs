use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuickstepError {
    #[error("io error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    ConfigParse(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("cli error: {0}")]
    Cli(String),
    #[error("precondition violation: {0}")]
    PreconditionViolation(String),
    #[error("invalid element count {count}: must be between {min} and {max}")]
    InvalidElementCount { count: usize, min: usize, max: usize },
    #[error("invalid interval {0} ms: must be between 1 and 5000")]
    InvalidInterval(u64),
    #[error("playback error: {0}")]
    Playback(String),
    #[error("terminal error: {0}")]
    Terminal(String),
}
