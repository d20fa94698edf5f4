use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{Player, Team};

/// Maximum number of recent score entries and upcoming fixtures kept on a
/// [`PlayerRecord`].
pub const RECENT_FIXTURE_LIMIT: usize = 5;

/// Points scored by a player in one played fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureScore {
    pub fixture_id: u32,
    pub gameweek: u8,
    pub opponent_team: u32,
    pub was_home: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub kickoff: Option<OffsetDateTime>,
    pub minutes: u32,
    pub total_points: i32,
    pub goals_scored: u32,
    pub assists: u32,
    pub bonus: i32,
}

/// A fixture the player's club has still to play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingFixture {
    pub fixture_id: u32,
    pub gameweek: Option<u8>,
    pub opponent_team: u32,
    pub is_home: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub kickoff: Option<OffsetDateTime>,
    pub difficulty: u8,
}

/// Per-player detail as served by upstream, before joining with the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub history: Vec<FixtureScore>,
    pub upcoming: Vec<UpcomingFixture>,
}

/// Everything known about one player: roster identity, club, season
/// aggregates, recent scores and upcoming fixtures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player: Player,
    pub team: Option<Team>,
    /// Most recent last, at most [`RECENT_FIXTURE_LIMIT`] entries.
    pub recent_scores: Vec<FixtureScore>,
    /// Soonest first, at most [`RECENT_FIXTURE_LIMIT`] entries.
    pub upcoming: Vec<UpcomingFixture>,
}

impl PlayerRecord {
    pub fn new(player: Player, team: Option<Team>, summary: &PlayerSummary) -> Self {
        let skip = summary.history.len().saturating_sub(RECENT_FIXTURE_LIMIT);
        Self {
            player,
            team,
            recent_scores: summary.history[skip..].to_vec(),
            upcoming: summary
                .upcoming
                .iter()
                .take(RECENT_FIXTURE_LIMIT)
                .cloned()
                .collect(),
        }
    }

    pub fn recent_points(&self) -> i32 {
        self.recent_scores.iter().map(|s| s.total_points).sum()
    }

    pub fn recent_average(&self) -> Option<f64> {
        if self.recent_scores.is_empty() {
            None
        } else {
            Some(f64::from(self.recent_points()) / self.recent_scores.len() as f64)
        }
    }

    pub fn recent_minutes(&self) -> u32 {
        self.recent_scores.iter().map(|s| s.minutes).sum()
    }
}

/// Live stats for one player within a gameweek.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivePlayerStats {
    pub player_id: u32,
    pub minutes: u32,
    pub total_points: i32,
    pub goals_scored: u32,
    pub assists: u32,
    pub bonus: i32,
}
