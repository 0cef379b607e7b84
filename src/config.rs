use anyhow::{bail, Context};

use crate::store::DEFAULT_FETCH_LIMIT;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub max_connections: u32,
    pub fetch_limit: i64,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .context("DATABASE_URL must be set to the lead database")?;

        let max_connections = match lookup("LEAD_REVIEW_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("LEAD_REVIEW_MAX_CONNECTIONS is not a number: {raw}"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let fetch_limit = match lookup("LEAD_REVIEW_FETCH_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .with_context(|| format!("LEAD_REVIEW_FETCH_LIMIT is not a number: {raw}"))?,
            None => DEFAULT_FETCH_LIMIT,
        };
        if fetch_limit <= 0 {
            bail!("LEAD_REVIEW_FETCH_LIMIT must be positive, got {fetch_limit}");
        }

        Ok(Self {
            database_url,
            max_connections,
            fetch_limit,
        })
    }
}
