// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use crate::services::tracking::TrackingSettings;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// How often live sessions recompute elapsed time and calories
    pub tick_interval: Duration,
    /// Fixes buffered per session before pushes wait
    pub fix_buffer: usize,
    /// Daily activity goal used by the stats endpoint
    pub daily_goal_minutes: u32,
    /// Upper bound accepted for a dog's weight
    pub max_subject_weight_kg: f64,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            tick_interval: Duration::from_millis(50),
            fix_buffer: 64,
            daily_goal_minutes: 60,
            max_subject_weight_kg: 120.0,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset variables take their defaults; set but unparsable ones are errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let config = Self {
            port: parse_var("PORT", 8080)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            tick_interval: Duration::from_millis(parse_var("TICK_INTERVAL_MS", 1000)?),
            fix_buffer: parse_var("FIX_BUFFER", 256)?,
            daily_goal_minutes: parse_var("DAILY_GOAL_MINUTES", 60)?,
            max_subject_weight_kg: parse_var("MAX_SUBJECT_WEIGHT_KG", 120.0)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval.is_zero() {
            return Err(ConfigError::Invalid {
                name: "TICK_INTERVAL_MS",
                value: "0".to_string(),
            });
        }
        if self.fix_buffer == 0 {
            return Err(ConfigError::Invalid {
                name: "FIX_BUFFER",
                value: "0".to_string(),
            });
        }
        if !self.max_subject_weight_kg.is_finite() || self.max_subject_weight_kg <= 0.0 {
            return Err(ConfigError::Invalid {
                name: "MAX_SUBJECT_WEIGHT_KG",
                value: self.max_subject_weight_kg.to_string(),
            });
        }
        Ok(())
    }

    /// Session settings derived from this config.
    pub fn tracking_settings(&self) -> TrackingSettings {
        TrackingSettings {
            tick_interval: self.tick_interval,
            fix_buffer: self.fix_buffer,
            max_weight_kg: self.max_subject_weight_kg,
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-wide, so everything env-related lives in one test
    #[test]
    fn test_config_from_env() {
        env::set_var("PORT", "9090");
        env::set_var("TICK_INTERVAL_MS", "250");
        env::remove_var("FIX_BUFFER");

        let config = Config::from_env().expect("Config should load");
        assert_eq!(config.port, 9090);
        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert_eq!(config.fix_buffer, 256);
        assert_eq!(config.daily_goal_minutes, 60);

        env::set_var("PORT", "not-a-port");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));

        env::set_var("PORT", "9090");
        env::set_var("TICK_INTERVAL_MS", "0");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid {
                name: "TICK_INTERVAL_MS",
                ..
            })
        ));

        env::remove_var("PORT");
        env::remove_var("TICK_INTERVAL_MS");
    }

    #[test]
    fn test_tracking_settings() {
        let config = Config::default();
        let settings = config.tracking_settings();
        assert_eq!(settings.tick_interval, config.tick_interval);
        assert_eq!(settings.max_weight_kg, 120.0);
    }
}
