use crate::simulation::BotProfile;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Settings for the `simulate` binary, read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub seed: Option<u64>,
    pub sessions: usize,
    pub profile: BotProfile,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            sessions: 1000,
            profile: BotProfile::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let seed = parse_var(&lookup, "BRAIN_AGE_SEED", "an unsigned integer")?;
        let sessions = parse_var(&lookup, "BRAIN_AGE_SESSIONS", "a positive integer")?
            .unwrap_or(defaults.sessions);
        if sessions == 0 {
            return Err(ConfigError::Invalid {
                name: "BRAIN_AGE_SESSIONS",
                expected: "a positive integer",
                value: "0".to_string(),
            });
        }

        let accuracy = parse_var::<f64, _>(&lookup, "BRAIN_AGE_ACCURACY", "a number in [0, 1]")?
            .unwrap_or(defaults.profile.accuracy);
        if !(0.0..=1.0).contains(&accuracy) {
            return Err(ConfigError::Invalid {
                name: "BRAIN_AGE_ACCURACY",
                expected: "a number in [0, 1]",
                value: accuracy.to_string(),
            });
        }

        let reaction_ms = parse_var(&lookup, "BRAIN_AGE_REACTION_MS", "milliseconds")?
            .unwrap_or(defaults.profile.reaction_ms);

        let log_level = lookup("RUST_LOG").unwrap_or(defaults.log_level);

        Ok(Self {
            seed,
            sessions,
            profile: BotProfile {
                accuracy,
                reaction_ms,
            },
            log_level,
        })
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str, expected: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                name,
                expected,
                value,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_reads_all_keys() {
        let config = Config::from_lookup(lookup_from(&[
            ("BRAIN_AGE_SEED", "17"),
            ("BRAIN_AGE_SESSIONS", "250"),
            ("BRAIN_AGE_ACCURACY", "0.75"),
            ("BRAIN_AGE_REACTION_MS", " 600 "),
            ("RUST_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.seed, Some(17));
        assert_eq!(config.sessions, 250);
        assert_eq!(config.profile.accuracy, 0.75);
        assert_eq!(config.profile.reaction_ms, 600);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Config::from_lookup(lookup_from(&[("BRAIN_AGE_SESSIONS", "many")])).unwrap_err();
        assert!(err.to_string().contains("BRAIN_AGE_SESSIONS"));

        assert!(Config::from_lookup(lookup_from(&[("BRAIN_AGE_SESSIONS", "0")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("BRAIN_AGE_ACCURACY", "1.5")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("BRAIN_AGE_SEED", "-3")])).is_err());
    }
}
