use std::env;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};

use crate::rules::{Rulebook, Ruleset};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database: DatabaseConfig,
    pub rules: Rulebook,
}

impl Config {
    /// Reads the process environment; call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Config> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
        let url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| anyhow!("DATABASE_URL must be set"))?;
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 15)?;
        if max_connections == 0 {
            bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }

        let mut rules = Rulebook::default();
        rules.bracket = quotas(&lookup, "BRACKET", Ruleset::BRACKET)?;
        rules.league = quotas(&lookup, "LEAGUE", Ruleset::LEAGUE)?;

        Ok(Config {
            database: DatabaseConfig {
                url,
                max_connections,
            },
            rules,
        })
    }
}

fn quotas(
    lookup: &impl Fn(&str) -> Option<String>,
    prefix: &str,
    base: Ruleset,
) -> Result<Ruleset> {
    let bans_key = format!("{}_BANS_PER_TURN", prefix);
    let picks_key = format!("{}_PICKS_PER_TURN", prefix);
    let bans_per_turn = parse_or(lookup, &bans_key, base.bans_per_turn)?;
    let picks_per_turn = parse_or(lookup, &picks_key, base.picks_per_turn)?;
    if bans_per_turn == 0 || picks_per_turn == 0 {
        bail!("{} and {} must be at least 1", bans_key, picks_key);
    }
    Ok(Ruleset {
        bans_per_turn,
        picks_per_turn,
        ..base
    })
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{} is not a valid number: `{}`", key, raw)),
        _ => Ok(default),
    }
}
