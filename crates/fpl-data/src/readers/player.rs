use std::sync::Arc;

use tracing::debug;

use super::{fetch_json, not_found_on_404};
use crate::api_types::{normalize_live, normalize_player_summary};
use crate::cache::{CacheKey, CacheMode};
use crate::client::FplClient;
use crate::domain::{
    validate_gameweek, validate_id, BootstrapSnapshot, LivePlayerStats, Player, PlayerRecord,
    PlayerSummary,
};
use crate::error::{FplError, PlayerCandidate};

/// Resolve a free-text player name against the roster.
///
/// Matching is a case-insensitive substring search over full names. A single
/// match wins outright. With several matches, a unique exact match on full,
/// second or web name wins; otherwise the query is ambiguous and the error
/// lists the exact matches if there are any, or every partial match if not.
pub fn resolve_player_name<'a>(
    snapshot: &'a BootstrapSnapshot,
    name: &str,
) -> Result<&'a Player, FplError> {
    let query = name.trim();
    if query.is_empty() {
        return Err(FplError::invalid_input("player name must not be empty"));
    }

    let matches = snapshot.search_players(query);
    match matches.as_slice() {
        [] => Err(FplError::not_found(format!("player '{query}'"))),
        [only] => Ok(*only),
        _ => {
            let exact: Vec<&Player> = matches
                .iter()
                .copied()
                .filter(|p| is_exact_match(p, query))
                .collect();
            match exact.as_slice() {
                [only] => Ok(*only),
                [] => Err(ambiguous(query, &matches)),
                several => Err(ambiguous(query, several)),
            }
        }
    }
}

fn is_exact_match(player: &Player, query: &str) -> bool {
    let query = query.to_lowercase();
    [&player.full_name(), &player.second_name, &player.web_name]
        .iter()
        .any(|name| name.to_lowercase() == query)
}

fn ambiguous(query: &str, players: &[&Player]) -> FplError {
    FplError::AmbiguousMatch {
        query: query.to_string(),
        candidates: players
            .iter()
            .map(|p| PlayerCandidate {
                id: p.id,
                name: p.full_name(),
            })
            .collect(),
    }
}

/// Per-player detail and live gameweek stats.
#[derive(Debug, Clone)]
pub struct PlayerReader {
    client: FplClient,
}

impl PlayerReader {
    pub(crate) fn new(client: FplClient) -> Self {
        Self { client }
    }

    /// Player joined with club, last five scores and upcoming fixtures.
    pub async fn get_detail(&self, player_id: i64) -> Result<PlayerRecord, FplError> {
        let player_id = validate_id("player", player_id)?;
        let snapshot = self.client.bootstrap().get_snapshot().await?;
        let player = snapshot
            .player(player_id)
            .cloned()
            .ok_or_else(|| FplError::not_found(format!("player {player_id}")))?;

        let summary = self.summary(player_id).await?;
        let team = snapshot.team(player.team_id).cloned();
        Ok(PlayerRecord::new(player, team, &summary))
    }

    pub async fn get_detail_by_name(&self, name: &str) -> Result<PlayerRecord, FplError> {
        let player_id = self.resolve_name(name).await?;
        self.get_detail(i64::from(player_id)).await
    }

    /// Roster id for `name`; see [`resolve_player_name`].
    pub async fn resolve_name(&self, name: &str) -> Result<u32, FplError> {
        if name.trim().is_empty() {
            return Err(FplError::invalid_input("player name must not be empty"));
        }
        let snapshot = self.client.bootstrap().get_snapshot().await?;
        let player = resolve_player_name(&snapshot, name)?;
        debug!(query = name, player_id = player.id, "resolved player name");
        Ok(player.id)
    }

    /// Live stats for every player in `gameweek`. Never cached.
    pub async fn get_gameweek_live(
        &self,
        gameweek: i64,
    ) -> Result<Arc<Vec<LivePlayerStats>>, FplError> {
        let gameweek = validate_gameweek(gameweek)?;
        let fetcher = fetch_json(
            self.client.transport(),
            format!("event/{gameweek}/live/"),
            Vec::new(),
            normalize_live,
        );
        self.client
            .resolve_with(CacheKey::GameweekLive { gameweek }, CacheMode::Bypass, fetcher)
            .await
            .map_err(|e| not_found_on_404(e, || format!("live data for gameweek {gameweek}")))
    }

    async fn summary(&self, player_id: u32) -> Result<Arc<PlayerSummary>, FplError> {
        let fetcher = fetch_json(
            self.client.transport(),
            format!("element-summary/{player_id}/"),
            Vec::new(),
            normalize_player_summary,
        );
        self.client
            .resolve(CacheKey::PlayerSummary { player_id }, fetcher)
            .await
            .map_err(|e| not_found_on_404(e, || format!("player {player_id}")))
    }
}
