use std::sync::Arc;

use super::fetch_json;
use crate::api_types::normalize_bootstrap;
use crate::cache::{CacheKey, CacheMode};
use crate::client::FplClient;
use crate::domain::{
    validate_gameweek, BootstrapSnapshot, GameweekInfo, Player, Position, SeasonProgress, Team,
};
use crate::error::FplError;

const BOOTSTRAP_PATH: &str = "bootstrap-static/";

/// Season roster, clubs and gameweek calendar.
///
/// The whole snapshot lives under one cache key and is refreshed as a unit.
/// Searches and rankings filter the cached snapshot locally; upstream offers
/// no search endpoint.
#[derive(Debug, Clone)]
pub struct BootstrapReader {
    client: FplClient,
}

impl BootstrapReader {
    pub(crate) fn new(client: FplClient) -> Self {
        Self { client }
    }

    pub async fn get_snapshot(&self) -> Result<Arc<BootstrapSnapshot>, FplError> {
        self.load(CacheMode::Use).await
    }

    /// Refetch the snapshot even if the cached one is fresh.
    pub async fn refresh_snapshot(&self) -> Result<Arc<BootstrapSnapshot>, FplError> {
        self.load(CacheMode::Refresh).await
    }

    async fn load(&self, mode: CacheMode) -> Result<Arc<BootstrapSnapshot>, FplError> {
        let fetcher = fetch_json(
            self.client.transport(),
            String::from(BOOTSTRAP_PATH),
            Vec::new(),
            normalize_bootstrap,
        );
        self.client
            .resolve_with(CacheKey::Bootstrap, mode, fetcher)
            .await
    }

    pub async fn player(&self, player_id: u32) -> Result<Player, FplError> {
        self.get_snapshot()
            .await?
            .player(player_id)
            .cloned()
            .ok_or_else(|| FplError::not_found(format!("player {player_id}")))
    }

    pub async fn team(&self, team_id: u32) -> Result<Team, FplError> {
        self.get_snapshot()
            .await?
            .team(team_id)
            .cloned()
            .ok_or_else(|| FplError::not_found(format!("team {team_id}")))
    }

    pub async fn gameweek(&self, gameweek: i64) -> Result<GameweekInfo, FplError> {
        let gameweek = validate_gameweek(gameweek)?;
        self.get_snapshot()
            .await?
            .gameweek(gameweek)
            .cloned()
            .ok_or_else(|| FplError::not_found(format!("gameweek {gameweek}")))
    }

    /// `None` before the season starts.
    pub async fn current_gameweek(&self) -> Result<Option<GameweekInfo>, FplError> {
        Ok(self.get_snapshot().await?.current_gameweek().cloned())
    }

    /// `None` after the last deadline.
    pub async fn next_gameweek(&self) -> Result<Option<GameweekInfo>, FplError> {
        Ok(self.get_snapshot().await?.next_gameweek().cloned())
    }

    pub async fn search_players(&self, name: &str) -> Result<Vec<Player>, FplError> {
        if name.trim().is_empty() {
            return Err(FplError::invalid_input("player name must not be empty"));
        }
        let snapshot = self.get_snapshot().await?;
        Ok(snapshot.search_players(name).into_iter().cloned().collect())
    }

    /// Players at `position` costing at most `max_price` million with at least
    /// `min_minutes` played, best points per million first.
    pub async fn rank_by_position(
        &self,
        position: Position,
        max_price: f64,
        min_minutes: u32,
    ) -> Result<Vec<Player>, FplError> {
        if !max_price.is_finite() || max_price <= 0.0 {
            return Err(FplError::invalid_input(format!(
                "max price must be a positive number of millions, got {max_price}"
            )));
        }
        let snapshot = self.get_snapshot().await?;
        Ok(snapshot
            .rank_by_position(position, max_price, min_minutes)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn season_progress(&self) -> Result<SeasonProgress, FplError> {
        Ok(self.get_snapshot().await?.season_progress())
    }
}
