use std::collections::HashMap;
use std::env;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use strum::EnumString;

use matchday::models::MatchId;
use matchday::{Actor, Config, MatchService, PgStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase")]
enum Command {
    Migrate,
    Bracket,
    League,
    Cup,
    Show,
    Standings,
    Advance,
    Archive,
    Unarchive,
}

const USAGE: &str = "usage: matchday <migrate | bracket|league <name> <team>... | \
                     cup <name> <team[:player,...]>... | show <match_id> | \
                     standings <competition_id> | advance <match_id> | \
                     archive|unarchive <competition_id>>";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let command = args
        .next()
        .ok_or_else(|| anyhow!(USAGE))
        .and_then(|raw| {
            Command::from_str(&raw).map_err(|_| anyhow!("unknown command `{}`\n{}", raw, USAGE))
        })?;
    let args: Vec<String> = args.collect();

    let config = Config::from_env()?;
    let store = PgStore::connect(&config.database).await?;
    if command == Command::Migrate {
        store.migrate().await?;
        log::info!("database is up to date");
        return Ok(());
    }
    let service = MatchService::new(store, config.rules);

    match command {
        Command::Migrate => {}
        Command::Bracket | Command::League | Command::Cup => {
            let (name, teams) = match args.split_first() {
                Some((name, teams)) => (name.as_str(), teams.to_vec()),
                None => bail!(USAGE),
            };
            let created = match command {
                Command::Bracket => service.create_bracket(name, teams).await?,
                Command::League => service.create_league(name, teams).await?,
                _ => {
                    let (teams, rosters) = split_rosters(teams);
                    service.create_cup(name, teams, rosters).await?
                }
            };
            print_json(&created)?;
        }
        Command::Show => {
            let m = service.get_match(id_arg(&args)?).await?;
            let active_team = m.active_team().map(str::to_string);
            print_json(&serde_json::json!({ "match": m, "active_team": active_team }))?;
        }
        Command::Standings => print_json(&service.standings(id_arg(&args)?).await?)?,
        Command::Advance => print_json(&service.advance_winner(id_arg(&args)?).await?)?,
        Command::Archive | Command::Unarchive => {
            let archived = command == Command::Archive;
            let competition = service
                .set_archived(id_arg(&args)?, archived, &Actor::admin())
                .await?;
            print_json(&competition)?;
        }
    }
    Ok(())
}

fn id_arg(args: &[String]) -> Result<MatchId> {
    let raw = args.first().ok_or_else(|| anyhow!(USAGE))?;
    raw.parse()
        .with_context(|| format!("`{}` is not a valid id", raw))
}

/// `Alpha:ace,bolt` registers team Alpha with two players.
fn split_rosters(args: Vec<String>) -> (Vec<String>, HashMap<String, Vec<String>>) {
    let mut teams = Vec::with_capacity(args.len());
    let mut rosters = HashMap::new();
    for arg in args {
        match arg.split_once(':') {
            Some((team, players)) => {
                let players = players
                    .split(',')
                    .filter(|p| !p.trim().is_empty())
                    .map(str::to_string)
                    .collect();
                rosters.insert(team.to_string(), players);
                teams.push(team.to_string());
            }
            None => teams.push(arg),
        }
    }
    (teams, rosters)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
