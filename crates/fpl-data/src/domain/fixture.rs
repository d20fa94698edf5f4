use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A scheduled or played match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: u32,
    /// `None` while the match is unscheduled.
    pub gameweek: Option<u8>,
    pub home_team: u32,
    pub away_team: u32,
    #[serde(with = "time::serde::rfc3339::option")]
    pub kickoff: Option<OffsetDateTime>,
    /// Difficulty of this fixture for the home side, 1 (easy) to 5.
    pub home_difficulty: u8,
    pub away_difficulty: u8,
    pub finished: bool,
    pub home_score: Option<u8>,
    pub away_score: Option<u8>,
}

impl Fixture {
    pub const fn involves(&self, team_id: u32) -> bool {
        self.home_team == team_id || self.away_team == team_id
    }

    /// Difficulty from `team_id`'s point of view.
    pub const fn difficulty_for(&self, team_id: u32) -> Option<u8> {
        if self.home_team == team_id {
            Some(self.home_difficulty)
        } else if self.away_team == team_id {
            Some(self.away_difficulty)
        } else {
            None
        }
    }

    /// Orders by gameweek (unscheduled last), then kickoff, then id.
    pub fn schedule_order(a: &Self, b: &Self) -> Ordering {
        fn gameweek_rank(f: &Fixture) -> (bool, u8) {
            (f.gameweek.is_none(), f.gameweek.unwrap_or(0))
        }
        fn kickoff_rank(f: &Fixture) -> (bool, Option<OffsetDateTime>) {
            (f.kickoff.is_none(), f.kickoff)
        }

        gameweek_rank(a)
            .cmp(&gameweek_rank(b))
            .then_with(|| kickoff_rank(a).cmp(&kickoff_rank(b)))
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// Sort fixtures into schedule order.
pub fn sort_fixtures(fixtures: &mut [Fixture]) {
    fixtures.sort_by(Fixture::schedule_order);
}
