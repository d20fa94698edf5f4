//! # Domain Models
//!
//! Normalized records produced by the readers. Upstream JSON never leaves the
//! reader layer; everything returned to callers is one of these types.
//!
//! ## Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`BootstrapSnapshot`] | Season roster, clubs and gameweek calendar |
//! | [`Player`] | Roster entry with season aggregates |
//! | [`Team`] | Premier League club |
//! | [`GameweekInfo`] | Deadline, status and post-hoc stats of a gameweek |
//! | [`PlayerRecord`] | Player joined with recent scores and upcoming fixtures |
//! | [`ManagerProfile`] | Fantasy team summary, picks, transfers and history |
//! | [`GameweekPicks`] | Squad selection for one gameweek |
//! | [`Fixture`] | Match with difficulty rating per side |
//! | [`LivePlayerStats`] | In-progress stats for one player in a gameweek |
//!
//! All records are immutable once built. Cached records are shared behind
//! `Arc` and replaced wholesale on refetch.

mod fixture;
mod manager;
mod models;
mod player;
mod position;

use std::sync::Arc;

pub use fixture::{sort_fixtures, Fixture};
pub use manager::{
    ChipUsage, GameweekPicks, GameweekResult, ManagerProfile, ManagerSummary, Pick, Transfer,
    STARTING_SLOTS,
};
pub use models::{
    validate_gameweek, validate_id, BootstrapSnapshot, GameweekInfo, GameweekStats,
    GameweekStatus, Player, SeasonProgress, SeasonStats, Team, SEASON_GAMEWEEKS,
};
pub use player::{
    FixtureScore, LivePlayerStats, PlayerRecord, PlayerSummary, UpcomingFixture,
    RECENT_FIXTURE_LIMIT,
};
pub use position::Position;

/// A normalized record as held in the cache.
#[derive(Debug, Clone)]
pub enum Payload {
    Bootstrap(Arc<BootstrapSnapshot>),
    Manager(Arc<ManagerProfile>),
    Picks(Arc<GameweekPicks>),
    PlayerSummary(Arc<PlayerSummary>),
    Fixtures(Arc<Vec<Fixture>>),
    Live(Arc<Vec<LivePlayerStats>>),
}

/// A record type that can be stored as a [`Payload`].
pub trait Cacheable: Send + Sync + Sized + 'static {
    fn into_payload(record: Arc<Self>) -> Payload;

    /// `None` when `payload` holds a different record type.
    fn from_payload(payload: &Payload) -> Option<Arc<Self>>;
}

macro_rules! impl_cacheable {
    ($ty:ty, $variant:ident) => {
        impl Cacheable for $ty {
            fn into_payload(record: Arc<Self>) -> Payload {
                Payload::$variant(record)
            }

            fn from_payload(payload: &Payload) -> Option<Arc<Self>> {
                match payload {
                    Payload::$variant(record) => Some(Arc::clone(record)),
                    _ => None,
                }
            }
        }
    };
}

impl_cacheable!(BootstrapSnapshot, Bootstrap);
impl_cacheable!(ManagerProfile, Manager);
impl_cacheable!(GameweekPicks, Picks);
impl_cacheable!(PlayerSummary, PlayerSummary);
impl_cacheable!(Vec<Fixture>, Fixtures);
impl_cacheable!(Vec<LivePlayerStats>, Live);
