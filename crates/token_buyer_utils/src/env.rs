use std::{fmt::Display, str::FromStr};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    #[error("expect env {0}")]
    Missing(String),
    #[error("env {key}={value:?} invalid: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

pub fn get_env(key: &str, default_value: Option<&str>) -> Result<String, EnvError> {
    match (std::env::var(key), default_value) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(value)) => Ok(value.to_string()),
        (Err(_), None) => Err(EnvError::Missing(key.to_string())),
    }
}

/// Blank values count as unset, so `KEY=` in a `.env` file disables an override.
pub fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn get_env_parsed<T>(key: &str, default_value: Option<&str>) -> Result<T, EnvError>
where
    T: FromStr,
    T::Err: Display,
{
    let value = get_env(key, default_value)?;
    value.trim().parse().map_err(|err: T::Err| EnvError::Invalid {
        key: key.to_string(),
        value,
        reason: err.to_string(),
    })
}

pub fn get_optional_env_parsed<T>(key: &str) -> Result<Option<T>, EnvError>
where
    T: FromStr,
    T::Err: Display,
{
    get_optional_env(key)
        .map(|value| {
            value.parse().map_err(|err: T::Err| EnvError::Invalid {
                key: key.to_string(),
                value,
                reason: err.to_string(),
            })
        })
        .transpose()
}
