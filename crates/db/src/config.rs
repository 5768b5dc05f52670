use std::path::PathBuf;
use std::str::FromStr;

/// Which storage backend the services run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// JSON slots in a local directory.
    Local,
    /// PostgreSQL via `DATABASE_URL`.
    Remote,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" | "postgres" => Ok(Self::Remote),
            other => Err(ConfigError::Invalid {
                var: "COPEJEM_BACKEND",
                reason: format!("unknown backend '{other}', expected 'local' or 'remote'"),
            }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be set")]
    Missing { var: &'static str },

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Storage configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: BackendKind,
    /// Directory holding the local slots (default: `./data`).
    pub data_dir: PathBuf,
    /// Required when `backend` is [`BackendKind::Remote`].
    pub database_url: Option<String>,
    /// Remote pool size (default: `10`).
    pub max_connections: u32,
}

impl StoreConfig {
    /// Load configuration from the environment, reading `.env` first.
    ///
    /// | Env Var              | Default  |
    /// |----------------------|----------|
    /// | `COPEJEM_BACKEND`    | `local`  |
    /// | `COPEJEM_DATA_DIR`   | `./data` |
    /// | `DATABASE_URL`       | (none)   |
    /// | `DB_MAX_CONNECTIONS` | `10`     |
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = match lookup("COPEJEM_BACKEND") {
            Some(value) => value.parse()?,
            None => BackendKind::Local,
        };

        let data_dir = lookup("COPEJEM_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if backend == BackendKind::Remote && database_url.is_none() {
            return Err(ConfigError::Missing {
                var: "DATABASE_URL",
            });
        }

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS",
                reason: format!("'{value}' is not a valid u32"),
            })?,
            None => 10,
        };

        Ok(Self {
            backend,
            data_dir,
            database_url,
            max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_to_local_backend() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.backend, BackendKind::Local);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.max_connections, 10);
    }

    #[test]
    fn remote_requires_database_url() {
        let err = StoreConfig::from_lookup(lookup(&[("COPEJEM_BACKEND", "remote")])).unwrap_err();
        assert_matches!(err, ConfigError::Missing { var: "DATABASE_URL" });
    }

    #[test]
    fn remote_with_url_is_accepted() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("COPEJEM_BACKEND", "Remote"),
            ("DATABASE_URL", "postgres://localhost/copejem"),
            ("DB_MAX_CONNECTIONS", "4"),
        ]))
        .unwrap();
        assert_eq!(config.backend, BackendKind::Remote);
        assert_eq!(config.max_connections, 4);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = StoreConfig::from_lookup(lookup(&[("COPEJEM_BACKEND", "redis")])).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { var: "COPEJEM_BACKEND", .. });
    }

    #[test]
    fn bad_pool_size_is_rejected() {
        let err =
            StoreConfig::from_lookup(lookup(&[("DB_MAX_CONNECTIONS", "many")])).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { var: "DB_MAX_CONNECTIONS", .. });
    }
}
