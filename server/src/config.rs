//! Hub configuration, loaded from environment variables and CLI overrides.
//!
//! Trimmed to what this hub actually needs: no database, no JWT/pepper
//! secrets, no table economics. A single listen address is the only
//! required setting; challenge TTL and the AI jitter window are ambient
//! tuning knobs with sane defaults.

use std::net::SocketAddr;
use std::time::Duration;
use tablehub_engine::BotDifficulty;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct HubConfig {
    /// Listen address.
    pub bind: SocketAddr,
    /// Challenge TTL.
    pub challenge_ttl: Duration,
    /// AI driver jitter window.
    pub ai_min_delay_ms: u64,
    pub ai_max_delay_ms: u64,
    /// Difficulty assigned to bot seats filled in by `start-game`'s `aiCount`.
    pub default_bot_difficulty: BotDifficulty,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

impl HubConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if an override or env value fails to
    /// parse, or if `ai_min_delay_ms > ai_max_delay_ms`.
    pub fn from_env(bind_override: Option<SocketAddr>) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(addr) => addr,
            None => parse_env_or("HUB_BIND", "127.0.0.1:6969")?,
        };

        let challenge_ttl_secs: u64 = parse_env_or("CHALLENGE_TTL_SECS", "30")?;
        let ai_min_delay_ms: u64 = parse_env_or("AI_MIN_DELAY_MS", "800")?;
        let ai_max_delay_ms: u64 = parse_env_or("AI_MAX_DELAY_MS", "2000")?;
        let default_bot_difficulty = std::env::var("DEFAULT_BOT_DIFFICULTY")
            .ok()
            .and_then(|v| match v.to_lowercase().as_str() {
                "easy" => Some(BotDifficulty::Easy),
                "medium" => Some(BotDifficulty::Medium),
                "hard" => Some(BotDifficulty::Hard),
                _ => None,
            })
            .unwrap_or(BotDifficulty::Medium);

        let config = Self {
            bind,
            challenge_ttl: Duration::from_secs(challenge_ttl_secs),
            ai_min_delay_ms,
            ai_max_delay_ms,
            default_bot_difficulty,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.ai_min_delay_ms > self.ai_max_delay_ms {
            return Err(ConfigError::Invalid {
                var: "AI_MIN_DELAY_MS".to_string(),
                reason: "must not exceed AI_MAX_DELAY_MS".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_env_or<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse().map_err(|_| ConfigError::Invalid {
        var: key.to_string(),
        reason: format!("could not parse {raw:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = HubConfig {
            bind: "127.0.0.1:6969".parse().unwrap(),
            challenge_ttl: Duration::from_secs(30),
            ai_min_delay_ms: 800,
            ai_max_delay_ms: 2000,
            default_bot_difficulty: BotDifficulty::Medium,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn min_delay_above_max_is_rejected() {
        let config = HubConfig {
            bind: "127.0.0.1:6969".parse().unwrap(),
            challenge_ttl: Duration::from_secs(30),
            ai_min_delay_ms: 3000,
            ai_max_delay_ms: 2000,
            default_bot_difficulty: BotDifficulty::Medium,
        };
        assert!(config.validate().is_err());
    }
}
