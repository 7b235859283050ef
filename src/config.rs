use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::info;

use crate::error::{AppError, Result};
use crate::query::PageLimits;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub page_limits: PageLimits,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Config {
    ///Reads the process environment; call `dotenv()` first to pick up a `.env` file
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let page_limits = PageLimits {
            default_size: try_load(&lookup, "DEFAULT_PAGE_SIZE", "20")?,
            max_size: try_load(&lookup, "MAX_PAGE_SIZE", "100")?,
        };
        if page_limits.default_size < 1 || page_limits.max_size < 1 {
            return Err(AppError::Config("page sizes must be at least 1".into()));
        }
        if page_limits.default_size > page_limits.max_size {
            return Err(AppError::Config(
                "DEFAULT_PAGE_SIZE must not exceed MAX_PAGE_SIZE".into(),
            ));
        }

        let db_max_connections: u32 = try_load(&lookup, "DB_MAX_CONNECTIONS", "5")?;
        if db_max_connections == 0 {
            return Err(AppError::Config("DB_MAX_CONNECTIONS must be at least 1".into()));
        }

        Ok(Self {
            database_url: try_load(&lookup, "DATABASE_URL", "sqlite:quotes.db")?,
            bind_addr: try_load(&lookup, "BIND_ADDR", "0.0.0.0:8081")?,
            api_token: lookup("API_TOKEN")
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            page_limits,
            db_max_connections,
            db_acquire_timeout: Duration::from_secs(try_load(
                &lookup,
                "DB_ACQUIRE_TIMEOUT_SECS",
                "5",
            )?),
            max_upload_bytes: try_load(&lookup, "MAX_UPLOAD_BYTES", "10485760")?,
        })
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: &str) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.trim()
        .parse()
        .map_err(|e| AppError::Config(format!("invalid {key} value {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn falls_back_to_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.database_url, "sqlite:quotes.db");
        assert_eq!(config.bind_addr, "0.0.0.0:8081");
        assert_eq!(config.api_token, None);
        assert_eq!(config.page_limits, PageLimits::default());
        assert_eq!(config.db_acquire_timeout, Duration::from_secs(5));
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("API_TOKEN", " serenity-now "),
            ("DEFAULT_PAGE_SIZE", "5"),
            ("MAX_PAGE_SIZE", "10"),
        ])
        .unwrap();
        assert_eq!(config.api_token.as_deref(), Some("serenity-now"));
        assert_eq!(config.page_limits.default_size, 5);
        assert_eq!(config.page_limits.max_size, 10);
    }

    #[test]
    fn rejects_unparsable_numbers() {
        assert!(matches!(
            load(&[("MAX_PAGE_SIZE", "lots")]),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn rejects_default_above_ceiling() {
        assert!(matches!(
            load(&[("DEFAULT_PAGE_SIZE", "50"), ("MAX_PAGE_SIZE", "10")]),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn blank_token_disables_mutations() {
        assert_eq!(load(&[("API_TOKEN", "  ")]).unwrap().api_token, None);
    }
}
