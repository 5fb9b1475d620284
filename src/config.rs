use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub collection: String,
    pub catalog_path: PathBuf,
    pub commit_timeout: Option<Duration>,
    pub batch_limit: Option<usize>,
}

impl Config {
    pub fn new_from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://catalog.db?mode=rwc".to_string());

        let collection = lookup("CATALOG_COLLECTION").unwrap_or_else(|| "courses".to_string());
        if collection.trim().is_empty() {
            return Err(AppError::Config("CATALOG_COLLECTION must not be empty".to_string()));
        }

        let catalog_path = lookup("CATALOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/catalog.json"));

        let commit_timeout = parse_positive(&lookup, "COMMIT_TIMEOUT_SECS")?.map(Duration::from_secs);
        let batch_limit = parse_positive(&lookup, "BATCH_LIMIT")?.map(|n| n as usize);

        Ok(Self {
            database_url,
            collection,
            catalog_path,
            commit_timeout,
            batch_limit,
        })
    }
}

fn parse_positive<F>(lookup: &F, key: &str) -> Result<Option<u64>, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(AppError::Config(format!("{} must be a positive integer, got '{}'", key, raw))),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_with(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_with(&[]).expect("Failed to build config");
        assert_eq!(config.collection, "courses");
        assert_eq!(config.catalog_path, PathBuf::from("data/catalog.json"));
        assert!(config.database_url.starts_with("sqlite://"));
        assert!(config.commit_timeout.is_none());
        assert!(config.batch_limit.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_with(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("CATALOG_COLLECTION", "courses_2025_2"),
            ("COMMIT_TIMEOUT_SECS", "30"),
            ("BATCH_LIMIT", "500"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.collection, "courses_2025_2");
        assert_eq!(config.commit_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.batch_limit, Some(500));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(config_with(&[("COMMIT_TIMEOUT_SECS", "0")]), Err(AppError::Config(_))));
        assert!(matches!(config_with(&[("BATCH_LIMIT", "lots")]), Err(AppError::Config(_))));
        assert!(matches!(config_with(&[("CATALOG_COLLECTION", "")]), Err(AppError::Config(_))));
    }
}
