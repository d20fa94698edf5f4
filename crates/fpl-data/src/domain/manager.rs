use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Squad slots 1..=11 start; 12..=15 are the bench.
pub const STARTING_SLOTS: u8 = 11;

/// Headline numbers for a fantasy team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerSummary {
    pub team_name: String,
    pub manager_name: String,
    pub total_points: i64,
    pub overall_rank: Option<u64>,
    pub current_gameweek: Option<u8>,
    /// Squad value in millions at the last deadline.
    pub team_value: f64,
    /// Money in the bank in millions at the last deadline.
    pub bank: f64,
    pub total_transfers: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    pub player_id: u32,
    /// Squad slot, 1..=15.
    pub slot: u8,
    pub multiplier: u8,
    pub is_captain: bool,
    pub is_vice_captain: bool,
}

impl Pick {
    pub const fn is_starting(&self) -> bool {
        self.slot <= STARTING_SLOTS
    }
}

/// A team's result for one gameweek.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameweekResult {
    pub gameweek: u8,
    pub points: i32,
    pub total_points: i64,
    pub overall_rank: Option<u64>,
    pub bank: f64,
    pub value: f64,
    pub transfers: u32,
    pub transfers_cost: i32,
    pub points_on_bench: i32,
}

/// Squad selection for one gameweek.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameweekPicks {
    pub gameweek: u8,
    pub active_chip: Option<String>,
    pub picks: Vec<Pick>,
    pub result: Option<GameweekResult>,
}

impl GameweekPicks {
    pub fn starting_xi(&self) -> impl Iterator<Item = &Pick> {
        self.picks.iter().filter(|p| p.is_starting())
    }

    pub fn bench(&self) -> impl Iterator<Item = &Pick> {
        self.picks.iter().filter(|p| !p.is_starting())
    }

    pub fn captain(&self) -> Option<&Pick> {
        self.picks.iter().find(|p| p.is_captain)
    }

    pub fn vice_captain(&self) -> Option<&Pick> {
        self.picks.iter().find(|p| p.is_vice_captain)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub gameweek: u8,
    pub player_in: u32,
    pub player_out: u32,
    /// Prices in millions.
    pub cost_in: f64,
    pub cost_out: f64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub time: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipUsage {
    pub name: String,
    pub gameweek: u8,
}

/// A fantasy team as seen at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerProfile {
    pub team_id: u32,
    pub summary: ManagerSummary,
    /// Picks for the current gameweek; `None` before the season starts.
    pub current_picks: Option<GameweekPicks>,
    /// Oldest first.
    pub transfers: Vec<Transfer>,
    /// One entry per played gameweek, oldest first.
    pub history: Vec<GameweekResult>,
    pub chips: Vec<ChipUsage>,
}

impl ManagerProfile {
    pub fn best_gameweek(&self) -> Option<&GameweekResult> {
        self.history.iter().max_by_key(|r| (r.points, std::cmp::Reverse(r.gameweek)))
    }

    pub fn worst_gameweek(&self) -> Option<&GameweekResult> {
        self.history.iter().min_by_key(|r| (r.points, r.gameweek))
    }

    pub fn average_points(&self) -> Option<f64> {
        if self.history.is_empty() {
            return None;
        }
        let total: i64 = self.history.iter().map(|r| i64::from(r.points)).sum();
        Some(total as f64 / self.history.len() as f64)
    }

    pub fn points_spent_on_transfers(&self) -> i32 {
        self.history.iter().map(|r| r.transfers_cost).sum()
    }
}
