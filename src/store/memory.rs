use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{MatchStore, MatchTx};
use crate::models::{Competition, CompetitionId, Match, MatchId, NewCompetition, NewMatch};

#[derive(Debug, Clone, Default)]
struct Tables {
    matches: BTreeMap<MatchId, Match>,
    competitions: BTreeMap<CompetitionId, Competition>,
    last_match_id: MatchId,
    last_competition_id: CompetitionId,
}

/// In-process store. One transaction at a time holds the whole store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Committed copy of a match, outside of any transaction.
    pub async fn get_match(&self, id: MatchId) -> Option<Match> {
        self.tables.lock().await.matches.get(&id).cloned()
    }

    pub async fn match_count(&self) -> usize {
        self.tables.lock().await.matches.len()
    }
}

impl MatchStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx> {
        let guard = self.tables.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryTx { guard, staged })
    }
}

/// Writes go to a staged copy that replaces the tables on commit.
pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
}

impl MatchTx for MemoryTx {
    async fn load_match(&mut self, id: MatchId) -> Result<Option<Match>> {
        Ok(self.staged.matches.get(&id).cloned())
    }

    async fn save_match(&mut self, m: &Match) -> Result<()> {
        match self.staged.matches.get_mut(&m.id) {
            Some(row) => {
                *row = m.clone();
                Ok(())
            }
            None => bail!("match {} does not exist", m.id),
        }
    }

    async fn insert_match(&mut self, new: NewMatch) -> Result<Match> {
        if !self.staged.competitions.contains_key(&new.competition_id) {
            bail!("competition {} does not exist", new.competition_id);
        }
        if let Some(next) = new.next_match_id {
            if !self.staged.matches.contains_key(&next) {
                bail!("downstream match {} does not exist", next);
            }
        }
        self.staged.last_match_id += 1;
        let m = new.into_match(self.staged.last_match_id);
        self.staged.matches.insert(m.id, m.clone());
        Ok(m)
    }

    async fn insert_competition(&mut self, new: NewCompetition) -> Result<Competition> {
        self.staged.last_competition_id += 1;
        let competition = Competition {
            id: self.staged.last_competition_id,
            kind: new.kind,
            name: new.name,
            archived: false,
            participants: new.participants,
        };
        self.staged
            .competitions
            .insert(competition.id, competition.clone());
        Ok(competition)
    }

    async fn load_competition(&mut self, id: CompetitionId) -> Result<Option<Competition>> {
        Ok(self.staged.competitions.get(&id).cloned())
    }

    async fn save_competition(&mut self, c: &Competition) -> Result<()> {
        match self.staged.competitions.get_mut(&c.id) {
            Some(row) => {
                *row = c.clone();
                Ok(())
            }
            None => bail!("competition {} does not exist", c.id),
        }
    }

    async fn competition_matches(&mut self, id: CompetitionId) -> Result<Vec<Match>> {
        let mut matches: Vec<Match> = self
            .staged
            .matches
            .values()
            .filter(|m| m.competition_id == id)
            .cloned()
            .collect();
        matches.sort_by_key(|m| (m.round_number, m.match_index, m.id));
        Ok(matches)
    }

    async fn commit(self) -> Result<()> {
        let MemoryTx { mut guard, staged } = self;
        *guard = staged;
        Ok(())
    }
}
