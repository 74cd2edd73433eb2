//! Environment variable helpers used by [`CaptureConfig::from_env`](crate::CaptureConfig::from_env).

use std::str::FromStr;

/// Get environment variable parsed as `T`, or `default` if unset or unparsable.
#[inline]
pub(crate) fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Get environment variable as boolean.
///
/// "1", "true", "yes", "on" (case-insensitive) are true, anything else set
/// is false. Unset returns `default`.
#[inline]
pub(crate) fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}
