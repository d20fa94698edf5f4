use std::sync::Arc;

use tracing::debug;

use super::{fetch_json, not_found_on_404};
use crate::api_types::{
    normalize_manager_history, normalize_manager_summary, normalize_picks, normalize_transfers,
};
use crate::cache::CacheKey;
use crate::client::FplClient;
use crate::domain::{validate_gameweek, validate_id, GameweekPicks, ManagerProfile};
use crate::error::FplError;
use crate::http_client::Transport;

/// Fantasy-team profiles and per-gameweek picks.
///
/// A profile is assembled from four upstream resources and cached as one
/// record, so a retry refetches all of them.
#[derive(Debug, Clone)]
pub struct ManagerReader {
    client: FplClient,
}

impl ManagerReader {
    pub(crate) fn new(client: FplClient) -> Self {
        Self { client }
    }

    pub async fn get_profile(&self, team_id: i64) -> Result<Arc<ManagerProfile>, FplError> {
        let team_id = validate_id("team", team_id)?;
        let transport = self.client.transport().clone();
        self.client
            .resolve(CacheKey::Manager { team_id }, move || {
                let transport = transport.clone();
                async move { fetch_profile(&transport, team_id).await }
            })
            .await
            .map_err(|e| not_found_on_404(e, || format!("manager team {team_id}")))
    }

    pub async fn get_picks(
        &self,
        team_id: i64,
        gameweek: i64,
    ) -> Result<Arc<GameweekPicks>, FplError> {
        let team_id = validate_id("team", team_id)?;
        let gameweek = validate_gameweek(gameweek)?;
        let fetcher = fetch_json(
            self.client.transport(),
            picks_path(team_id, gameweek),
            Vec::new(),
            move |value| normalize_picks(gameweek, value),
        );
        self.client
            .resolve(CacheKey::ManagerPicks { team_id, gameweek }, fetcher)
            .await
            .map_err(|e| {
                not_found_on_404(e, || format!("picks for team {team_id} in gameweek {gameweek}"))
            })
    }
}

fn picks_path(team_id: u32, gameweek: u8) -> String {
    format!("entry/{team_id}/event/{gameweek}/picks/")
}

async fn fetch_profile(transport: &Transport, team_id: u32) -> Result<ManagerProfile, FplError> {
    let summary =
        normalize_manager_summary(transport.fetch(&format!("entry/{team_id}/"), &[]).await?)?;
    let (history, chips) = normalize_manager_history(
        transport
            .fetch(&format!("entry/{team_id}/history/"), &[])
            .await?,
    )?;
    let transfers = normalize_transfers(
        transport
            .fetch(&format!("entry/{team_id}/transfers/"), &[])
            .await?,
    )?;

    let current_picks = match summary.current_gameweek {
        Some(gameweek) => match transport.fetch(&picks_path(team_id, gameweek), &[]).await {
            Ok(value) => Some(normalize_picks(gameweek, value)?),
            // Teams created after the current deadline have no picks yet.
            Err(FplError::HttpStatus { status: 404, .. }) => {
                debug!(team_id, gameweek, "no picks for current gameweek");
                None
            }
            Err(error) => return Err(error),
        },
        None => None,
    };

    Ok(ManagerProfile {
        team_id,
        summary,
        current_picks,
        transfers,
        history,
        chips,
    })
}
