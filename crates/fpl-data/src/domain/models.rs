use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Position;
use crate::error::FplError;

/// Number of gameweeks in a season.
pub const SEASON_GAMEWEEKS: u8 = 38;

/// Validate a caller-supplied gameweek number against `1..=38`.
pub fn validate_gameweek(gameweek: i64) -> Result<u8, FplError> {
    if (1..=i64::from(SEASON_GAMEWEEKS)).contains(&gameweek) {
        Ok(gameweek as u8)
    } else {
        Err(FplError::invalid_input(format!(
            "gameweek must be between 1 and {SEASON_GAMEWEEKS}, got {gameweek}"
        )))
    }
}

/// Validate a caller-supplied upstream identifier (team, manager, player).
pub fn validate_id(kind: &str, id: i64) -> Result<u32, FplError> {
    u32::try_from(id)
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| {
            FplError::invalid_input(format!("{kind} id must be a positive integer, got {id}"))
        })
}

/// Premier League club.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub short_name: String,
    pub strength: u8,
}

/// Season-to-date aggregates for a player.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeasonStats {
    pub total_points: i32,
    pub points_per_game: f64,
    pub form: f64,
    pub minutes: u32,
    pub goals_scored: u32,
    pub assists: u32,
    pub clean_sheets: u32,
    pub bonus: i32,
    pub ict_index: f64,
    pub selected_by_percent: f64,
}

/// Player as listed in the season bootstrap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub first_name: String,
    pub second_name: String,
    pub web_name: String,
    pub team_id: u32,
    pub position: Position,
    /// Price in tenths of a million.
    pub now_cost: u32,
    pub stats: SeasonStats,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.second_name)
    }

    /// Price in millions.
    pub fn price(&self) -> f64 {
        f64::from(self.now_cost) / 10.0
    }

    /// Season points per million of price; zero for a zero price.
    pub fn points_per_million(&self) -> f64 {
        if self.now_cost == 0 {
            0.0
        } else {
            f64::from(self.stats.total_points) / self.price()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameweekStatus {
    Current,
    Next,
    Finished,
    Upcoming,
}

/// Post-hoc statistics, only known once a gameweek is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameweekStats {
    pub average_score: u32,
    pub highest_score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameweekInfo {
    pub id: u8,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub deadline: OffsetDateTime,
    pub finished: bool,
    pub is_current: bool,
    pub is_next: bool,
    pub stats: Option<GameweekStats>,
}

impl GameweekInfo {
    pub const fn status(&self) -> GameweekStatus {
        if self.is_current {
            GameweekStatus::Current
        } else if self.is_next {
            GameweekStatus::Next
        } else if self.finished {
            GameweekStatus::Finished
        } else {
            GameweekStatus::Upcoming
        }
    }
}

/// Season progress derived from the gameweek list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonProgress {
    pub total: u8,
    pub current: Option<u8>,
    pub finished: u8,
    pub remaining: u8,
}

impl SeasonProgress {
    /// Completed share of the season as a whole percentage.
    pub fn percent_complete(&self) -> u8 {
        match (self.current, self.total) {
            (Some(current), total) if total > 0 => {
                (u32::from(current) * 100 / u32::from(total)) as u8
            }
            _ => 0,
        }
    }
}

/// Full roster, clubs and gameweek calendar for the season.
///
/// Fetched and replaced as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapSnapshot {
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    pub gameweeks: Vec<GameweekInfo>,
    pub total_managers: u64,
}

impl BootstrapSnapshot {
    pub fn player(&self, id: u32) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn team(&self, id: u32) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn gameweek(&self, id: u8) -> Option<&GameweekInfo> {
        self.gameweeks.iter().find(|g| g.id == id)
    }

    pub fn current_gameweek(&self) -> Option<&GameweekInfo> {
        self.gameweeks.iter().find(|g| g.is_current)
    }

    pub fn next_gameweek(&self) -> Option<&GameweekInfo> {
        self.gameweeks.iter().find(|g| g.is_next)
    }

    /// Players whose full name contains `query`, ignoring case.
    pub fn search_players(&self, query: &str) -> Vec<&Player> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.players
            .iter()
            .filter(|p| p.full_name().to_lowercase().contains(&needle))
            .collect()
    }

    /// Players at `position` within budget and minutes, best value first.
    pub fn rank_by_position(
        &self,
        position: Position,
        max_price: f64,
        min_minutes: u32,
    ) -> Vec<&Player> {
        let max_cost = (max_price * 10.0).round();
        let mut ranked: Vec<&Player> = self
            .players
            .iter()
            .filter(|p| {
                p.position == position
                    && f64::from(p.now_cost) <= max_cost
                    && p.stats.minutes >= min_minutes
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.points_per_million()
                .partial_cmp(&a.points_per_million())
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        ranked
    }

    pub fn season_progress(&self) -> SeasonProgress {
        let total = self.gameweeks.len().min(usize::from(u8::MAX)) as u8;
        let current = self.current_gameweek().map(|g| g.id);
        let finished = self.gameweeks.iter().filter(|g| g.finished).count() as u8;
        let remaining = total.saturating_sub(current.unwrap_or(0));
        SeasonProgress {
            total,
            current,
            finished,
            remaining,
        }
    }
}
