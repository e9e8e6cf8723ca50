use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Config error: {0}")]
    ConfigError(#[from] std::io::Error),
    #[error("Parsing error: {0}")]
    ParsingError(#[from] toml::de::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Reasons a grid cannot be built. None of these are fatal to the engine:
/// it logs the error and waits for the next bar.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Anchor price {0} must be positive")]
    NonPositiveAnchor(f64),
    #[error("Max grid shares must be at least 1")]
    InvalidShares,
    #[error("Grid distance {0} must be in (0, 1)")]
    InvalidDistance(f64),
}
