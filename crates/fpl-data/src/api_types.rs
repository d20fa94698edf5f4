//! Upstream JSON shapes and their normalization into domain records.
//!
//! Wire structs mirror only the fields this crate consumes. Each `normalize_*`
//! function deserializes a raw payload and validates it, failing with
//! [`FplError::Decode`] on any schema mismatch.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use time::OffsetDateTime;

use crate::domain::{
    BootstrapSnapshot, ChipUsage, Fixture, FixtureScore, GameweekInfo, GameweekPicks,
    GameweekResult, GameweekStats, LivePlayerStats, ManagerSummary, Pick, Player, PlayerSummary,
    Position, SeasonStats, Team, Transfer, UpcomingFixture, SEASON_GAMEWEEKS,
};
use crate::error::FplError;

fn decode<T: DeserializeOwned>(what: &str, value: Value) -> Result<T, FplError> {
    serde_json::from_value(value).map_err(|e| FplError::decode(format!("{what}: {e}")))
}

fn check_gameweek(what: &str, gameweek: u8) -> Result<u8, FplError> {
    if (1..=SEASON_GAMEWEEKS).contains(&gameweek) {
        Ok(gameweek)
    } else {
        Err(FplError::decode(format!(
            "{what}: gameweek {gameweek} outside 1..={SEASON_GAMEWEEKS}"
        )))
    }
}

fn check_optional_gameweek(what: &str, gameweek: Option<u8>) -> Result<Option<u8>, FplError> {
    gameweek.map(|gw| check_gameweek(what, gw)).transpose()
}

/// Upstream serializes several decimals as strings ("5.4").
fn decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Decimal {
        Number(f64),
        Text(String),
    }

    match Decimal::deserialize(deserializer)? {
        Decimal::Number(value) => Ok(value),
        Decimal::Text(text) if text.trim().is_empty() => Ok(0.0),
        Decimal::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid decimal '{text}'"))),
    }
}

fn tenths(value: i64) -> f64 {
    value as f64 / 10.0
}

// ---------------------------------------------------------------------------
// bootstrap-static/
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct BootstrapWire {
    elements: Vec<ElementWire>,
    teams: Vec<TeamWire>,
    events: Vec<EventWire>,
    #[serde(default)]
    total_players: u64,
}

#[derive(Debug, Deserialize)]
struct ElementWire {
    id: u32,
    first_name: String,
    second_name: String,
    #[serde(default)]
    web_name: String,
    team: u32,
    element_type: u8,
    now_cost: u32,
    #[serde(default)]
    total_points: i32,
    #[serde(default, deserialize_with = "decimal")]
    points_per_game: f64,
    #[serde(default, deserialize_with = "decimal")]
    form: f64,
    #[serde(default)]
    minutes: u32,
    #[serde(default)]
    goals_scored: u32,
    #[serde(default)]
    assists: u32,
    #[serde(default)]
    clean_sheets: u32,
    #[serde(default)]
    bonus: i32,
    #[serde(default, deserialize_with = "decimal")]
    ict_index: f64,
    #[serde(default, deserialize_with = "decimal")]
    selected_by_percent: f64,
}

#[derive(Debug, Deserialize)]
struct TeamWire {
    id: u32,
    name: String,
    short_name: String,
    #[serde(default)]
    strength: u8,
}

#[derive(Debug, Deserialize)]
struct EventWire {
    id: u8,
    name: String,
    #[serde(with = "time::serde::rfc3339")]
    deadline_time: OffsetDateTime,
    #[serde(default)]
    finished: bool,
    #[serde(default)]
    is_current: bool,
    #[serde(default)]
    is_next: bool,
    #[serde(default)]
    average_entry_score: Option<u32>,
    #[serde(default)]
    highest_score: Option<u32>,
}

pub(crate) fn normalize_bootstrap(value: Value) -> Result<BootstrapSnapshot, FplError> {
    let wire: BootstrapWire = decode("bootstrap", value)?;

    let players = wire
        .elements
        .into_iter()
        .map(|e| {
            let position = Position::from_element_type(e.element_type).ok_or_else(|| {
                FplError::decode(format!(
                    "bootstrap: player {} has unknown element_type {}",
                    e.id, e.element_type
                ))
            })?;
            Ok(Player {
                id: e.id,
                first_name: e.first_name,
                second_name: e.second_name,
                web_name: e.web_name,
                team_id: e.team,
                position,
                now_cost: e.now_cost,
                stats: SeasonStats {
                    total_points: e.total_points,
                    points_per_game: e.points_per_game,
                    form: e.form,
                    minutes: e.minutes,
                    goals_scored: e.goals_scored,
                    assists: e.assists,
                    clean_sheets: e.clean_sheets,
                    bonus: e.bonus,
                    ict_index: e.ict_index,
                    selected_by_percent: e.selected_by_percent,
                },
            })
        })
        .collect::<Result<Vec<_>, FplError>>()?;

    let teams = wire
        .teams
        .into_iter()
        .map(|t| Team {
            id: t.id,
            name: t.name,
            short_name: t.short_name,
            strength: t.strength,
        })
        .collect();

    let gameweeks = wire
        .events
        .into_iter()
        .map(|e| {
            let stats = match (e.finished, e.average_entry_score, e.highest_score) {
                (true, Some(average_score), Some(highest_score)) => Some(GameweekStats {
                    average_score,
                    highest_score,
                }),
                _ => None,
            };
            Ok(GameweekInfo {
                id: check_gameweek("bootstrap event", e.id)?,
                name: e.name,
                deadline: e.deadline_time,
                finished: e.finished,
                is_current: e.is_current,
                is_next: e.is_next,
                stats,
            })
        })
        .collect::<Result<Vec<_>, FplError>>()?;

    Ok(BootstrapSnapshot {
        players,
        teams,
        gameweeks,
        total_managers: wire.total_players,
    })
}

// ---------------------------------------------------------------------------
// element-summary/{id}/ and event/{gw}/live/
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ElementSummaryWire {
    #[serde(default)]
    fixtures: Vec<SummaryFixtureWire>,
    #[serde(default)]
    history: Vec<SummaryHistoryWire>,
}

#[derive(Debug, Deserialize)]
struct SummaryFixtureWire {
    id: u32,
    event: Option<u8>,
    team_h: u32,
    team_a: u32,
    is_home: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    kickoff_time: Option<OffsetDateTime>,
    difficulty: u8,
}

#[derive(Debug, Deserialize)]
struct SummaryHistoryWire {
    fixture: u32,
    round: u8,
    opponent_team: u32,
    was_home: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    kickoff_time: Option<OffsetDateTime>,
    #[serde(default)]
    minutes: u32,
    #[serde(default)]
    total_points: i32,
    #[serde(default)]
    goals_scored: u32,
    #[serde(default)]
    assists: u32,
    #[serde(default)]
    bonus: i32,
}

pub(crate) fn normalize_player_summary(value: Value) -> Result<PlayerSummary, FplError> {
    let wire: ElementSummaryWire = decode("player summary", value)?;

    let history = wire
        .history
        .into_iter()
        .map(|h| {
            Ok(FixtureScore {
                fixture_id: h.fixture,
                gameweek: check_gameweek("player history", h.round)?,
                opponent_team: h.opponent_team,
                was_home: h.was_home,
                kickoff: h.kickoff_time,
                minutes: h.minutes,
                total_points: h.total_points,
                goals_scored: h.goals_scored,
                assists: h.assists,
                bonus: h.bonus,
            })
        })
        .collect::<Result<Vec<_>, FplError>>()?;

    let upcoming = wire
        .fixtures
        .into_iter()
        .map(|f| {
            Ok(UpcomingFixture {
                fixture_id: f.id,
                gameweek: check_optional_gameweek("player fixtures", f.event)?,
                opponent_team: if f.is_home { f.team_a } else { f.team_h },
                is_home: f.is_home,
                kickoff: f.kickoff_time,
                difficulty: f.difficulty,
            })
        })
        .collect::<Result<Vec<_>, FplError>>()?;

    Ok(PlayerSummary { history, upcoming })
}

#[derive(Debug, Deserialize)]
struct LiveWire {
    elements: Vec<LiveElementWire>,
}

#[derive(Debug, Deserialize)]
struct LiveElementWire {
    id: u32,
    stats: LiveStatsWire,
}

#[derive(Debug, Deserialize)]
struct LiveStatsWire {
    #[serde(default)]
    minutes: u32,
    #[serde(default)]
    total_points: i32,
    #[serde(default)]
    goals_scored: u32,
    #[serde(default)]
    assists: u32,
    #[serde(default)]
    bonus: i32,
}

pub(crate) fn normalize_live(value: Value) -> Result<Vec<LivePlayerStats>, FplError> {
    let wire: LiveWire = decode("gameweek live", value)?;
    Ok(wire
        .elements
        .into_iter()
        .map(|e| LivePlayerStats {
            player_id: e.id,
            minutes: e.stats.minutes,
            total_points: e.stats.total_points,
            goals_scored: e.stats.goals_scored,
            assists: e.stats.assists,
            bonus: e.stats.bonus,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// fixtures/
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FixtureWire {
    id: u32,
    event: Option<u8>,
    team_h: u32,
    team_a: u32,
    #[serde(default, with = "time::serde::rfc3339::option")]
    kickoff_time: Option<OffsetDateTime>,
    team_h_difficulty: u8,
    team_a_difficulty: u8,
    #[serde(default)]
    finished: bool,
    #[serde(default)]
    team_h_score: Option<u8>,
    #[serde(default)]
    team_a_score: Option<u8>,
}

pub(crate) fn normalize_fixtures(value: Value) -> Result<Vec<Fixture>, FplError> {
    let wire: Vec<FixtureWire> = decode("fixtures", value)?;
    wire.into_iter()
        .map(|f| {
            Ok(Fixture {
                id: f.id,
                gameweek: check_optional_gameweek("fixtures", f.event)?,
                home_team: f.team_h,
                away_team: f.team_a,
                kickoff: f.kickoff_time,
                home_difficulty: f.team_h_difficulty,
                away_difficulty: f.team_a_difficulty,
                finished: f.finished,
                home_score: f.team_h_score,
                away_score: f.team_a_score,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// entry/{id}/...
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct EntryWire {
    name: String,
    #[serde(default)]
    player_first_name: String,
    #[serde(default)]
    player_last_name: String,
    #[serde(default)]
    summary_overall_points: Option<i64>,
    #[serde(default)]
    summary_overall_rank: Option<u64>,
    #[serde(default)]
    current_event: Option<u8>,
    #[serde(default)]
    last_deadline_value: Option<i64>,
    #[serde(default)]
    last_deadline_bank: Option<i64>,
    #[serde(default)]
    last_deadline_total_transfers: Option<u32>,
}

pub(crate) fn normalize_manager_summary(value: Value) -> Result<ManagerSummary, FplError> {
    let wire: EntryWire = decode("manager", value)?;
    Ok(ManagerSummary {
        team_name: wire.name,
        manager_name: format!("{} {}", wire.player_first_name, wire.player_last_name)
            .trim()
            .to_string(),
        total_points: wire.summary_overall_points.unwrap_or(0),
        overall_rank: wire.summary_overall_rank,
        current_gameweek: check_optional_gameweek("manager", wire.current_event)?,
        team_value: tenths(wire.last_deadline_value.unwrap_or(0)),
        bank: tenths(wire.last_deadline_bank.unwrap_or(0)),
        total_transfers: wire.last_deadline_total_transfers.unwrap_or(0),
    })
}

#[derive(Debug, Deserialize)]
struct EntryHistoryWire {
    event: u8,
    points: i32,
    total_points: i64,
    #[serde(default)]
    overall_rank: Option<u64>,
    #[serde(default)]
    bank: i64,
    #[serde(default)]
    value: i64,
    #[serde(default)]
    event_transfers: u32,
    #[serde(default)]
    event_transfers_cost: i32,
    #[serde(default)]
    points_on_bench: i32,
}

impl EntryHistoryWire {
    fn normalize(self, what: &str) -> Result<GameweekResult, FplError> {
        Ok(GameweekResult {
            gameweek: check_gameweek(what, self.event)?,
            points: self.points,
            total_points: self.total_points,
            overall_rank: self.overall_rank,
            bank: tenths(self.bank),
            value: tenths(self.value),
            transfers: self.event_transfers,
            transfers_cost: self.event_transfers_cost,
            points_on_bench: self.points_on_bench,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChipWire {
    name: String,
    event: u8,
}

#[derive(Debug, Deserialize)]
struct ManagerHistoryWire {
    #[serde(default)]
    current: Vec<EntryHistoryWire>,
    #[serde(default)]
    chips: Vec<ChipWire>,
}

pub(crate) fn normalize_manager_history(
    value: Value,
) -> Result<(Vec<GameweekResult>, Vec<ChipUsage>), FplError> {
    let wire: ManagerHistoryWire = decode("manager history", value)?;
    let history = wire
        .current
        .into_iter()
        .map(|h| h.normalize("manager history"))
        .collect::<Result<Vec<_>, _>>()?;
    let chips = wire
        .chips
        .into_iter()
        .map(|c| {
            Ok(ChipUsage {
                name: c.name,
                gameweek: check_gameweek("manager chips", c.event)?,
            })
        })
        .collect::<Result<Vec<_>, FplError>>()?;
    Ok((history, chips))
}

#[derive(Debug, Deserialize)]
struct TransferWire {
    element_in: u32,
    element_in_cost: i64,
    element_out: u32,
    element_out_cost: i64,
    event: u8,
    #[serde(default, with = "time::serde::rfc3339::option")]
    time: Option<OffsetDateTime>,
}

pub(crate) fn normalize_transfers(value: Value) -> Result<Vec<Transfer>, FplError> {
    let wire: Vec<TransferWire> = decode("manager transfers", value)?;
    let mut transfers = wire
        .into_iter()
        .map(|t| {
            Ok(Transfer {
                gameweek: check_gameweek("manager transfers", t.event)?,
                player_in: t.element_in,
                player_out: t.element_out,
                cost_in: tenths(t.element_in_cost),
                cost_out: tenths(t.element_out_cost),
                time: t.time,
            })
        })
        .collect::<Result<Vec<_>, FplError>>()?;
    transfers.sort_by_key(|t| (t.gameweek, t.time));
    Ok(transfers)
}

#[derive(Debug, Deserialize)]
struct PicksWire {
    #[serde(default)]
    active_chip: Option<String>,
    #[serde(default)]
    entry_history: Option<EntryHistoryWire>,
    picks: Vec<PickWire>,
}

#[derive(Debug, Deserialize)]
struct PickWire {
    element: u32,
    position: u8,
    #[serde(default)]
    multiplier: u8,
    #[serde(default)]
    is_captain: bool,
    #[serde(default)]
    is_vice_captain: bool,
}

pub(crate) fn normalize_picks(gameweek: u8, value: Value) -> Result<GameweekPicks, FplError> {
    let wire: PicksWire = decode("manager picks", value)?;
    let mut picks: Vec<Pick> = wire
        .picks
        .into_iter()
        .map(|p| Pick {
            player_id: p.element,
            slot: p.position,
            multiplier: p.multiplier,
            is_captain: p.is_captain,
            is_vice_captain: p.is_vice_captain,
        })
        .collect();
    picks.sort_by_key(|p| p.slot);

    Ok(GameweekPicks {
        gameweek,
        active_chip: wire.active_chip,
        picks,
        result: wire
            .entry_history
            .map(|h| h.normalize("manager picks"))
            .transpose()?,
    })
}
