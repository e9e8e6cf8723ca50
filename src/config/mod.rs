use self::strategy::StrategyConfig;
use crate::error::BotError;
use std::fs;

pub mod simulation;
pub mod strategy;

pub fn load_config(path: &str) -> Result<StrategyConfig, BotError> {
    let content = fs::read_to_string(path)?;
    let config: StrategyConfig = toml::from_str(&content)?;
    config
        .validate()
        .map_err(|e| BotError::ValidationError(e.to_string()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
type = "turn_grid"
symbol = "BTC"
grid_distance = 0.01
max_grid_shares = 0
equity_target_return = 0.02
fee_rate = 0.001
"#
        )
        .unwrap();
        let err = load_config(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, BotError::ValidationError(_)));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/strategy.toml").unwrap_err();
        assert!(matches!(err, BotError::ConfigError(_)));
    }

    #[test]
    fn test_load_config_ok() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
type = "turn_grid"
symbol = "BTC"
grid_distance = 0.01
max_grid_shares = 6
equity_target_return = 0.02
fee_rate = 0.001
"#
        )
        .unwrap();
        let config = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.symbol(), "BTC");
    }
}
