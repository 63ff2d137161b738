use crate::PulseError;
use secrecy::SecretString;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://pulse-server.drivelinebaseball.com/third_party_api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct Config {
    pub client_id: String,
    pub client_secret: SecretString,
    pub refresh_token: SecretString,
    pub base_url: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, PulseError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function. This avoids mutating global environment in tests and keeps
    /// `from_env()` small and safe.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, PulseError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let client_id = get("PULSE_CLIENT_ID")
            .ok_or_else(|| PulseError::Config("PULSE_CLIENT_ID missing".into()))?;
        let client_secret = get("PULSE_CLIENT_SECRET")
            .ok_or_else(|| PulseError::Config("PULSE_CLIENT_SECRET missing".into()))?;
        let refresh_token = get("PULSE_REFRESH_TOKEN")
            .ok_or_else(|| PulseError::Config("PULSE_REFRESH_TOKEN missing".into()))?;
        let base_url = get("PULSE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let timeout_secs = match get("PULSE_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                PulseError::Config(format!("PULSE_HTTP_TIMEOUT_SECS invalid ({raw}): {e}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            client_id,
            client_secret: SecretString::new(client_secret.into()),
            refresh_token: SecretString::new(refresh_token.into()),
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_env(k: &str) -> Option<String> {
        match k {
            "PULSE_CLIENT_ID" => Some("cid".into()),
            "PULSE_CLIENT_SECRET" => Some("sekrit".into()),
            "PULSE_REFRESH_TOKEN" => Some("refresh".into()),
            "PULSE_BASE_URL" => Some("http://localhost".into()),
            _ => None,
        }
    }

    #[test]
    fn from_env_missing_refresh_token() {
        let get = |k: &str| match k {
            "PULSE_REFRESH_TOKEN" => None,
            other => full_env(other),
        };
        let res = Config::from_env_with(get);
        assert!(matches!(res, Err(PulseError::Config(_))));
    }

    #[test]
    fn from_env_reads_values() {
        let cfg = Config::from_env_with(full_env).expect("cfg");
        assert_eq!(cfg.client_id, "cid");
        assert_eq!(cfg.base_url, "http://localhost");
        assert_eq!(cfg.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn from_env_defaults_base_url_and_parses_timeout() {
        let get = |k: &str| match k {
            "PULSE_BASE_URL" => None,
            "PULSE_HTTP_TIMEOUT_SECS" => Some("5".into()),
            other => full_env(other),
        };
        let cfg = Config::from_env_with(get).expect("cfg");
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout, Duration::from_secs(5));
    }

    #[test]
    fn from_env_rejects_bad_timeout() {
        let get = |k: &str| match k {
            "PULSE_HTTP_TIMEOUT_SECS" => Some("soon".into()),
            other => full_env(other),
        };
        assert!(Config::from_env_with(get).is_err());
    }
}
