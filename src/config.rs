use std::{env, path::PathBuf};
use tracing::warn;
use url::Url;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SESSION_PATH: &str = "data/session.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),

    #[error("invalid backend url {value:?}: {source}")]
    InvalidUrl {
        value: String,
        source: url::ParseError,
    },
}

/// Settings read from the process environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: Url,
    pub anon_key: String,
    pub port: u16,
    pub session_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup so tests never touch the real environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let first = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(*key))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        let raw_url = first(&["SUPABASE_URL", "VITE_SUPABASE_URL"])
            .ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let backend_url = Url::parse(&raw_url).map_err(|source| ConfigError::InvalidUrl {
            value: raw_url.clone(),
            source,
        })?;
        let anon_key = first(&["SUPABASE_ANON_KEY", "VITE_SUPABASE_ANON_KEY"])
            .ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?;

        let port = match first(&["PORT"]) {
            Some(value) => value.parse::<u16>().unwrap_or_else(|err| {
                warn!("ignoring invalid PORT {value:?} ({err}), using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };
        let session_path = first(&["APP_SESSION_PATH"])
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_PATH));

        Ok(Self {
            backend_url,
            anon_key,
            port,
            session_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn reads_backend_settings_with_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]))
        .unwrap();

        assert_eq!(config.backend_url.as_str(), "https://project.supabase.co/");
        assert_eq!(config.anon_key, "anon");
        assert_eq!(config.port, 8080);
        assert_eq!(config.session_path, PathBuf::from("data/session.json"));
    }

    #[test]
    fn falls_back_to_vite_prefixed_keys() {
        let config = Config::from_lookup(lookup(&[
            ("VITE_SUPABASE_URL", "http://127.0.0.1:54321"),
            ("VITE_SUPABASE_ANON_KEY", "anon"),
            ("PORT", "9000"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.backend_url.port(), Some(54321));
    }

    #[test]
    fn unparsable_port_falls_back_to_default() {
        let config = Config::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("PORT", "80800"),
        ]))
        .unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn missing_key_is_reported() {
        let err = Config::from_lookup(lookup(&[("SUPABASE_URL", "https://x.supabase.co")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SUPABASE_ANON_KEY")));
    }

    #[test]
    fn invalid_url_is_reported() {
        let err = Config::from_lookup(lookup(&[
            ("SUPABASE_URL", "not a url"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }
}
