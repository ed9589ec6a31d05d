//! Environment parsing shared by the config resolvers.
//!
//! Resolvers take an [`EnvSource`] instead of reading `std::env` directly so
//! tests can feed values without touching the process environment.

use std::str::FromStr;

use crate::error::ConfigError;

/// Lookup function for environment-style overrides.
pub type EnvSource<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Reads the real process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// A set, non-blank variable, trimmed.
pub(crate) fn optional_env(env: EnvSource<'_>, key: &str) -> Result<Option<String>, ConfigError> {
    Ok(env(key)
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty()))
}

pub(crate) fn parse_string_env(
    env: EnvSource<'_>,
    key: &str,
    default: String,
) -> Result<String, ConfigError> {
    Ok(optional_env(env, key)?.unwrap_or(default))
}

pub(crate) fn parse_bool_env(
    env: EnvSource<'_>,
    key: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    match optional_env(env, key)? {
        None => Ok(default),
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected a boolean, got '{other}'"),
            }),
        },
    }
}

pub(crate) fn parse_number_env<T>(env: EnvSource<'_>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(env, key)? {
        None => Ok(default),
        Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("'{raw}' is not a valid number: {e}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn blank_values_fall_back_to_default() {
        let env = env_from(&[("NAME", "   ")]);
        assert_eq!(
            parse_string_env(&env, "NAME", "fallback".to_string()).unwrap(),
            "fallback"
        );
    }

    #[test]
    fn bool_parsing_accepts_common_spellings() {
        let env = env_from(&[("A", "Yes"), ("B", "off"), ("C", "maybe")]);
        assert!(parse_bool_env(&env, "A", false).unwrap());
        assert!(!parse_bool_env(&env, "B", true).unwrap());
        assert!(parse_bool_env(&env, "C", true).is_err());
        assert!(parse_bool_env(&env, "D", true).unwrap());
    }

    #[test]
    fn number_parsing_reports_the_key() {
        let env = env_from(&[("DAYS", "thirty")]);
        let err = parse_number_env::<i64>(&env, "DAYS", 30).unwrap_err();
        let ConfigError::InvalidValue { key, .. } = err else {
            panic!("expected InvalidValue");
        };
        assert_eq!(key, "DAYS");
    }
}
