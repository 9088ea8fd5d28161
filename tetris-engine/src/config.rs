//! Configuration for a Game

use std::time::Duration;

use crate::error::{EngineError, Result};
use crate::scoring;

/// Main configuration for a Game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Level the game starts at (1-based)
    pub start_level: u32,

    /// Rows to clear for each level-up
    pub rows_per_level: usize,

    /// Drop interval per level, starting at level 1
    pub drop_intervals: Vec<Duration>,

    /// Lower bound for the drop interval, used past the end of the table
    pub min_drop_interval: Duration,

    /// How long a display should show the points just gained
    pub score_display: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_level: 1,
            rows_per_level: 10,
            drop_intervals: scoring::default_drop_intervals(),
            min_drop_interval: Duration::from_millis(scoring::MIN_DROP_INTERVAL_MS),
            score_display: Duration::from_secs(1),
        }
    }
}

impl GameConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the starting level
    pub fn with_start_level(mut self, level: u32) -> Self {
        self.start_level = level;
        self
    }

    /// Set the number of rows per level
    pub fn with_rows_per_level(mut self, rows: usize) -> Self {
        self.rows_per_level = rows;
        self
    }

    /// Replace the per-level drop interval table
    pub fn with_drop_intervals(mut self, intervals: Vec<Duration>) -> Self {
        self.drop_intervals = intervals;
        self
    }

    /// Use one fixed drop interval for every level
    pub fn with_fixed_drop_interval(mut self, interval: Duration) -> Self {
        self.drop_intervals = vec![interval];
        self.min_drop_interval = interval;
        self
    }

    /// Set the drop interval floor
    pub fn with_min_drop_interval(mut self, interval: Duration) -> Self {
        self.min_drop_interval = interval;
        self
    }

    /// Set how long the gained points stay on screen
    pub fn with_score_display(mut self, duration: Duration) -> Self {
        self.score_display = duration;
        self
    }

    /// Reject settings the game loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.start_level == 0 {
            return Err(EngineError::InvalidConfig("start level must be at least 1".into()));
        }
        if self.rows_per_level == 0 {
            return Err(EngineError::InvalidConfig("rows per level must be at least 1".into()));
        }
        if self.min_drop_interval.is_zero() {
            return Err(EngineError::InvalidConfig("minimum drop interval must be positive".into()));
        }
        if self.drop_intervals.windows(2).any(|pair| pair[0] < pair[1]) {
            return Err(EngineError::InvalidConfig(
                "drop intervals must not grow with the level".into(),
            ));
        }
        Ok(())
    }

    /// Drop interval at `level`
    pub fn drop_interval(&self, level: u32) -> Duration {
        scoring::drop_interval(level, &self.drop_intervals, self.min_drop_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.start_level, 1);
        assert_eq!(config.rows_per_level, 10);
        assert_eq!(config.drop_interval(1), Duration::from_millis(1000));
        assert_eq!(config.drop_interval(12), Duration::from_millis(120));
        assert_eq!(config.score_display, Duration::from_secs(1));
    }

    #[test]
    fn test_builder_methods() {
        let config = GameConfig::new()
            .with_start_level(3)
            .with_rows_per_level(5)
            .with_fixed_drop_interval(Duration::from_millis(200))
            .with_score_display(Duration::from_millis(500));
        assert!(config.validate().is_ok());
        assert_eq!(config.drop_interval(1), Duration::from_millis(200));
        assert_eq!(config.drop_interval(7), Duration::from_millis(200));
        assert_eq!(config.score_display, Duration::from_millis(500));
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let cases = [
            GameConfig::new().with_start_level(0),
            GameConfig::new().with_rows_per_level(0),
            GameConfig::new().with_min_drop_interval(Duration::ZERO),
            GameConfig::new().with_drop_intervals(vec![Duration::from_millis(100), Duration::from_millis(200)]),
        ];
        for config in cases {
            assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))), "{config:?}");
        }
    }
}
