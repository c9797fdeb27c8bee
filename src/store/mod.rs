//! Persistence for matches and competitions.
//!
//! Every engine operation runs inside one [`MatchTx`]: rows read through it
//! stay locked until the transaction is committed or dropped, and dropping it
//! discards everything written.

use anyhow::Result;

use crate::models::{Competition, CompetitionId, Match, MatchId, NewCompetition, NewMatch};

mod memory;
mod postgres;

pub use memory::{MemoryStore, MemoryTx};
pub use postgres::{PgStore, PgTx};

#[allow(async_fn_in_trait)]
pub trait MatchStore {
    type Tx: MatchTx;

    async fn begin(&self) -> Result<Self::Tx>;
}

#[allow(async_fn_in_trait)]
pub trait MatchTx {
    /// Loads and locks a match.
    async fn load_match(&mut self, id: MatchId) -> Result<Option<Match>>;

    async fn save_match(&mut self, m: &Match) -> Result<()>;

    async fn insert_match(&mut self, new: NewMatch) -> Result<Match>;

    async fn insert_competition(&mut self, new: NewCompetition) -> Result<Competition>;

    /// Loads and locks a competition.
    async fn load_competition(&mut self, id: CompetitionId) -> Result<Option<Competition>>;

    async fn save_competition(&mut self, c: &Competition) -> Result<()>;

    /// Matches of a competition ordered by round, then index.
    async fn competition_matches(&mut self, id: CompetitionId) -> Result<Vec<Match>>;

    async fn commit(self) -> Result<()>;
}
