use std::str::FromStr;

use anyhow::{bail, Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use super::{MatchStore, MatchTx};
use crate::config::DatabaseConfig;
use crate::models::{
    Competition, CompetitionId, Match, MatchId, MatchKind, NewCompetition, NewMatch, ScoreDraft,
};
use crate::state::MatchState;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<PgStore> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .context("failed to connect to the database")?;
        Ok(PgStore { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("failed to run migrations")?;
        Ok(())
    }
}

impl MatchStore for PgStore {
    type Tx = PgTx;

    async fn begin(&self) -> Result<PgTx> {
        let tx = self.pool.begin().await?;
        Ok(PgTx { tx })
    }
}

pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[derive(Debug, FromRow)]
struct MatchRow {
    id: i32,
    competition_id: i32,
    kind: String,
    round_number: i32,
    match_index: i32,
    next_match_id: Option<i32>,
    team_a: String,
    team_b: String,
    state: String,
    lobby_code: Option<String>,
    banned_maps: Vec<String>,
    picked_maps: Vec<String>,
    scores_a: Vec<i32>,
    scores_b: Vec<i32>,
    draft_a: Option<Json<ScoreDraft>>,
    draft_b: Option<Json<ScoreDraft>>,
    lineup_a: Vec<String>,
    lineup_b: Vec<String>,
    confirmed_a: bool,
    confirmed_b: bool,
}

impl TryFrom<MatchRow> for Match {
    type Error = anyhow::Error;

    fn try_from(row: MatchRow) -> Result<Match> {
        let kind = MatchKind::from_str(&row.kind)
            .with_context(|| format!("match {} has unknown kind `{}`", row.id, row.kind))?;
        let state = MatchState::from_str(&row.state)
            .with_context(|| format!("match {} has unknown state `{}`", row.id, row.state))?;
        Ok(Match {
            id: row.id,
            competition_id: row.competition_id,
            kind,
            round_number: row.round_number,
            match_index: row.match_index,
            next_match_id: row.next_match_id,
            team_a: row.team_a,
            team_b: row.team_b,
            state,
            lobby_code: row.lobby_code,
            banned_maps: row.banned_maps,
            picked_maps: row.picked_maps,
            scores_a: row.scores_a,
            scores_b: row.scores_b,
            draft_a: row.draft_a.map(|d| d.0),
            draft_b: row.draft_b.map(|d| d.0),
            lineup_a: row.lineup_a,
            lineup_b: row.lineup_b,
            confirmed_a: row.confirmed_a,
            confirmed_b: row.confirmed_b,
        })
    }
}

#[derive(Debug, FromRow)]
struct CompetitionRow {
    id: i32,
    kind: String,
    name: String,
    archived: bool,
    participants: Vec<String>,
}

impl TryFrom<CompetitionRow> for Competition {
    type Error = anyhow::Error;

    fn try_from(row: CompetitionRow) -> Result<Competition> {
        let kind = MatchKind::from_str(&row.kind)
            .with_context(|| format!("competition {} has unknown kind `{}`", row.id, row.kind))?;
        Ok(Competition {
            id: row.id,
            kind,
            name: row.name,
            archived: row.archived,
            participants: row.participants,
        })
    }
}

impl MatchTx for PgTx {
    async fn load_match(&mut self, id: MatchId) -> Result<Option<Match>> {
        let row = sqlx::query_as::<_, MatchRow>("SELECT * FROM matches WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(Match::try_from).transpose()
    }

    async fn save_match(&mut self, m: &Match) -> Result<()> {
        let result = sqlx::query(
            "UPDATE matches SET next_match_id = $2, team_a = $3, team_b = $4, state = $5, \
             lobby_code = $6, banned_maps = $7, picked_maps = $8, scores_a = $9, scores_b = $10, \
             draft_a = $11, draft_b = $12, lineup_a = $13, lineup_b = $14, confirmed_a = $15, \
             confirmed_b = $16 WHERE id = $1",
        )
        .bind(m.id)
        .bind(m.next_match_id)
        .bind(&m.team_a)
        .bind(&m.team_b)
        .bind(m.state.to_string())
        .bind(&m.lobby_code)
        .bind(&m.banned_maps)
        .bind(&m.picked_maps)
        .bind(&m.scores_a)
        .bind(&m.scores_b)
        .bind(m.draft_a.clone().map(Json))
        .bind(m.draft_b.clone().map(Json))
        .bind(&m.lineup_a)
        .bind(&m.lineup_b)
        .bind(m.confirmed_a)
        .bind(m.confirmed_b)
        .execute(&mut *self.tx)
        .await?;
        if result.rows_affected() == 0 {
            bail!("match {} does not exist", m.id);
        }
        Ok(())
    }

    async fn insert_match(&mut self, new: NewMatch) -> Result<Match> {
        let row = sqlx::query_as::<_, MatchRow>(
            "INSERT INTO matches (competition_id, kind, round_number, match_index, \
             next_match_id, team_a, team_b, state) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(new.competition_id)
        .bind(new.kind.to_string())
        .bind(new.round_number)
        .bind(new.match_index)
        .bind(new.next_match_id)
        .bind(&new.team_a)
        .bind(&new.team_b)
        .bind(new.state.to_string())
        .fetch_one(&mut *self.tx)
        .await?;
        Match::try_from(row)
    }

    async fn insert_competition(&mut self, new: NewCompetition) -> Result<Competition> {
        let row = sqlx::query_as::<_, CompetitionRow>(
            "INSERT INTO competitions (kind, name, participants) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(new.kind.to_string())
        .bind(&new.name)
        .bind(&new.participants)
        .fetch_one(&mut *self.tx)
        .await?;
        Competition::try_from(row)
    }

    async fn load_competition(&mut self, id: CompetitionId) -> Result<Option<Competition>> {
        let row = sqlx::query_as::<_, CompetitionRow>(
            "SELECT * FROM competitions WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(Competition::try_from).transpose()
    }

    async fn save_competition(&mut self, c: &Competition) -> Result<()> {
        let result = sqlx::query(
            "UPDATE competitions SET name = $2, archived = $3, participants = $4 WHERE id = $1",
        )
        .bind(c.id)
        .bind(&c.name)
        .bind(c.archived)
        .bind(&c.participants)
        .execute(&mut *self.tx)
        .await?;
        if result.rows_affected() == 0 {
            bail!("competition {} does not exist", c.id);
        }
        Ok(())
    }

    async fn competition_matches(&mut self, id: CompetitionId) -> Result<Vec<Match>> {
        let rows = sqlx::query_as::<_, MatchRow>(
            "SELECT * FROM matches WHERE competition_id = $1 \
             ORDER BY round_number, match_index, id",
        )
        .bind(id)
        .fetch_all(&mut *self.tx)
        .await?;
        rows.into_iter().map(Match::try_from).collect()
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
