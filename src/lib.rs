//! Match lifecycle engine for brackets, cups and leagues: map ban/pick drafts,
//! two-sided score reports, lineup confirmation and bracket advancement.

pub mod bracket;
pub mod competition;
pub mod config;
pub mod error;
pub mod lineup;
pub mod lobby;
pub mod models;
pub mod rules;
pub mod scoring;
pub mod service;
pub mod state;
pub mod store;
pub mod veto;

pub use bracket::Advancement;
pub use config::Config;
pub use error::{EngineError, ErrorKind, TransitionError};
pub use models::{Actor, Competition, Match, MatchKind};
pub use rules::{Rulebook, Ruleset};
pub use scoring::{ScoreOutcome, ScoreSheet, ScoreSubmission};
pub use service::{CompetitionOverview, MatchService, ScoreReport};
pub use state::{MatchState, Side};
pub use store::{MatchStore, MatchTx, MemoryStore, PgStore};
