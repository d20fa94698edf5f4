//! Shared fixtures for the behavior tests.
//!
//! Payloads are trimmed-down copies of real upstream responses: three
//! gameweeks, four clubs, five players and a single fantasy team.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use fpl_data::{ClientConfig, FplClient, RetryPolicy, StubHttpClient, StubReply};
use serde_json::json;

pub const BASE_URL: &str = "https://fpl.test/api";
pub const TEAM_ID: u32 = 1_234_567;
pub const SALAH: u32 = 328;
pub const SALAS: u32 = 401;
pub const HAALAND: u32 = 355;
pub const LIVERPOOL: u32 = 12;

pub fn config() -> ClientConfig {
    ClientConfig::default()
        .with_base_url(BASE_URL)
        .with_retry(3, Duration::from_secs(2))
}

pub fn client_with(stub: Arc<StubHttpClient>, config: ClientConfig) -> FplClient {
    FplClient::builder(config)
        .http_client(stub)
        .retry_policy(RetryPolicy::new(3, Duration::from_secs(2)))
        .build()
}

pub fn client(stub: Arc<StubHttpClient>) -> FplClient {
    client_with(stub, config())
}

/// Stub answering every resource the readers touch.
pub fn full_stub() -> StubHttpClient {
    StubHttpClient::new(BASE_URL)
        .route("bootstrap-static/", StubReply::json(bootstrap_json()))
        .route(
            &format!("element-summary/{SALAH}/"),
            StubReply::json(element_summary_json()),
        )
        .route("fixtures/", StubReply::json(fixtures_json()))
        .route_with_params(
            "fixtures/",
            &[("event", String::from("2"))],
            vec![StubReply::json(gameweek_two_fixtures_json())],
        )
        .route("event/2/live/", StubReply::json(live_json()))
        .route(&format!("entry/{TEAM_ID}/"), StubReply::json(entry_json()))
        .route(
            &format!("entry/{TEAM_ID}/history/"),
            StubReply::json(entry_history_json()),
        )
        .route(
            &format!("entry/{TEAM_ID}/transfers/"),
            StubReply::json(transfers_json()),
        )
        .route(
            &format!("entry/{TEAM_ID}/event/2/picks/"),
            StubReply::json(picks_json()),
        )
}

#[allow(clippy::too_many_arguments)]
fn element(
    id: u32,
    first: &str,
    second: &str,
    web: &str,
    team: u32,
    element_type: u8,
    cost: u32,
    points: i32,
    minutes: u32,
) -> serde_json::Value {
    json!({
        "id": id,
        "first_name": first,
        "second_name": second,
        "web_name": web,
        "team": team,
        "element_type": element_type,
        "now_cost": cost,
        "total_points": points,
        "points_per_game": "5.0",
        "form": "4.2",
        "minutes": minutes,
        "goals_scored": 0,
        "assists": 0,
        "clean_sheets": 0,
        "bonus": 0,
        "ict_index": "10.0",
        "selected_by_percent": "12.3"
    })
}

pub fn bootstrap_json() -> String {
    json!({
        "elements": [
            element(SALAH, "Mohamed", "Salah", "M.Salah", LIVERPOOL, 3, 130, 210, 2400),
            element(SALAS, "Carlos", "Salas", "Salas", 3, 3, 45, 20, 300),
            element(HAALAND, "Erling", "Haaland", "Haaland", 13, 4, 150, 190, 2200),
            element(1, "Alisson", "Becker", "Alisson", LIVERPOOL, 1, 55, 120, 2700),
            element(2, "Trent", "Alexander-Arnold", "Alexander-Arnold", LIVERPOOL, 2, 70, 140, 2500)
        ],
        "teams": [
            {"id": 3, "name": "Bournemouth", "short_name": "BOU", "strength": 3},
            {"id": LIVERPOOL, "name": "Liverpool", "short_name": "LIV", "strength": 5},
            {"id": 13, "name": "Man City", "short_name": "MCI", "strength": 5},
            {"id": 14, "name": "Man Utd", "short_name": "MUN", "strength": 4}
        ],
        "events": [
            {"id": 1, "name": "Gameweek 1", "deadline_time": "2024-08-16T17:30:00Z",
             "finished": true, "is_current": false, "is_next": false,
             "average_entry_score": 57, "highest_score": 127},
            {"id": 2, "name": "Gameweek 2", "deadline_time": "2024-08-24T10:00:00Z",
             "finished": false, "is_current": true, "is_next": false,
             "average_entry_score": 0, "highest_score": null},
            {"id": 3, "name": "Gameweek 3", "deadline_time": "2024-08-31T10:00:00Z",
             "finished": false, "is_current": false, "is_next": true,
             "average_entry_score": 0, "highest_score": null}
        ],
        "total_players": 11_000_000
    })
    .to_string()
}

pub fn element_summary_json() -> String {
    let history: Vec<_> = (1..=7u32)
        .map(|round| {
            json!({
                "fixture": 100 + round,
                "round": round,
                "opponent_team": 14,
                "was_home": round % 2 == 0,
                "kickoff_time": "2024-08-17T14:00:00Z",
                "minutes": 90,
                "total_points": round,
                "goals_scored": 0,
                "assists": 0,
                "bonus": 0
            })
        })
        .collect();
    json!({
        "history": history,
        "fixtures": [
            {"id": 201, "event": 8, "team_h": LIVERPOOL, "team_a": 14, "is_home": true,
             "kickoff_time": "2024-10-05T14:00:00Z", "difficulty": 3},
            {"id": 202, "event": 9, "team_h": 13, "team_a": LIVERPOOL, "is_home": false,
             "kickoff_time": "2024-10-19T14:00:00Z", "difficulty": 5}
        ]
    })
    .to_string()
}

fn fixture(
    id: u32,
    event: Option<u8>,
    home: u32,
    away: u32,
    kickoff: Option<&str>,
    finished: bool,
) -> serde_json::Value {
    json!({
        "id": id,
        "event": event,
        "team_h": home,
        "team_a": away,
        "kickoff_time": kickoff,
        "team_h_difficulty": 3,
        "team_a_difficulty": 4,
        "finished": finished,
        "team_h_score": if finished { Some(2) } else { None },
        "team_a_score": if finished { Some(1) } else { None }
    })
}

/// Deliberately out of schedule order.
pub fn fixtures_json() -> String {
    json!([
        fixture(5, Some(3), LIVERPOOL, 3, Some("2024-08-31T14:00:00Z"), false),
        fixture(3, Some(2), 13, 14, Some("2024-08-24T16:30:00Z"), false),
        fixture(1, Some(1), LIVERPOOL, 13, Some("2024-08-17T14:00:00Z"), true),
        fixture(9, None, LIVERPOOL, 14, None, false),
        fixture(4, Some(2), 3, LIVERPOOL, Some("2024-08-24T14:00:00Z"), false),
        fixture(2, Some(1), 3, 14, Some("2024-08-17T14:00:00Z"), true),
        fixture(6, Some(3), 13, 14, Some("2024-08-31T14:00:00Z"), false)
    ])
    .to_string()
}

pub fn gameweek_two_fixtures_json() -> String {
    json!([
        fixture(4, Some(2), 3, LIVERPOOL, Some("2024-08-24T14:00:00Z"), false),
        fixture(3, Some(2), 13, 14, Some("2024-08-24T16:30:00Z"), false)
    ])
    .to_string()
}

pub fn live_json() -> String {
    json!({
        "elements": [
            {
                "id": SALAH,
                "stats": {
                    "minutes": 90,
                    "total_points": 12,
                    "goals_scored": 1,
                    "assists": 1,
                    "bonus": 3
                }
            },
            {
                "id": HAALAND,
                "stats": {
                    "minutes": 60,
                    "total_points": 2,
                    "goals_scored": 0,
                    "assists": 0,
                    "bonus": 0
                }
            }
        ]
    })
    .to_string()
}

pub fn entry_json() -> String {
    json!({
        "name": "Klopp Till I Drop",
        "player_first_name": "Alex",
        "player_last_name": "Doe",
        "summary_overall_points": 130,
        "summary_overall_rank": 250_000,
        "current_event": 2,
        "last_deadline_value": 1003,
        "last_deadline_bank": 5,
        "last_deadline_total_transfers": 1
    })
    .to_string()
}

pub fn entry_history_json() -> String {
    json!({
        "current": [
            {"event": 1, "points": 72, "total_points": 72, "overall_rank": 400_000, "bank": 5,
             "value": 1000, "event_transfers": 0, "event_transfers_cost": 0, "points_on_bench": 4},
            {"event": 2, "points": 58, "total_points": 126, "overall_rank": 250_000, "bank": 5,
             "value": 1003, "event_transfers": 1, "event_transfers_cost": 4, "points_on_bench": 9}
        ],
        "chips": [{"name": "wildcard", "event": 2}]
    })
    .to_string()
}

pub fn transfers_json() -> String {
    json!([
        {"element_in": SALAH, "element_in_cost": 130, "element_out": SALAS,
         "element_out_cost": 45, "event": 2, "time": "2024-08-23T09:00:00Z"}
    ])
    .to_string()
}

pub fn picks_json() -> String {
    let picks: Vec<_> = (1..=15u8)
        .map(|slot| {
            json!({
                "element": u32::from(slot) + 500,
                "position": slot,
                "multiplier": if slot == 1 { 2 } else if slot <= 11 { 1 } else { 0 },
                "is_captain": slot == 1,
                "is_vice_captain": slot == 2
            })
        })
        .collect();
    json!({
        "active_chip": "wildcard",
        "entry_history": {"event": 2, "points": 58, "total_points": 126, "overall_rank": 250_000,
                          "bank": 5, "value": 1003, "event_transfers": 1,
                          "event_transfers_cost": 4, "points_on_bench": 9},
        "picks": picks
    })
    .to_string()
}
