use std::collections::BTreeSet;
use std::sync::Arc;

use super::fetch_json;
use crate::api_types::normalize_fixtures;
use crate::cache::CacheKey;
use crate::client::FplClient;
use crate::domain::{sort_fixtures, validate_gameweek, validate_id, Fixture};
use crate::error::FplError;

const FIXTURES_PATH: &str = "fixtures/";

/// Season fixture list with difficulty ratings.
///
/// Results are in schedule order: gameweek, then kickoff, then fixture id,
/// with unscheduled fixtures last.
#[derive(Debug, Clone)]
pub struct FixturesReader {
    client: FplClient,
}

impl FixturesReader {
    pub(crate) fn new(client: FplClient) -> Self {
        Self { client }
    }

    pub async fn get_all(&self) -> Result<Arc<Vec<Fixture>>, FplError> {
        let fetcher = fetch_json(
            self.client.transport(),
            String::from(FIXTURES_PATH),
            Vec::new(),
            |value| {
                let mut fixtures = normalize_fixtures(value)?;
                sort_fixtures(&mut fixtures);
                Ok(fixtures)
            },
        );
        self.client.resolve(CacheKey::Fixtures, fetcher).await
    }

    /// Fixtures in one gameweek, filtered upstream.
    pub async fn get_by_gameweek(&self, gameweek: i64) -> Result<Arc<Vec<Fixture>>, FplError> {
        let gameweek = validate_gameweek(gameweek)?;
        let fetcher = fetch_json(
            self.client.transport(),
            String::from(FIXTURES_PATH),
            vec![("event", gameweek.to_string())],
            move |value| {
                let mut fixtures = normalize_fixtures(value)?;
                fixtures.retain(|f| f.gameweek == Some(gameweek));
                sort_fixtures(&mut fixtures);
                Ok(fixtures)
            },
        );
        self.client
            .resolve(CacheKey::FixturesByGameweek { gameweek }, fetcher)
            .await
    }

    /// Fixtures involving `team_id`, optionally only those not yet finished.
    pub async fn get_by_team(
        &self,
        team_id: i64,
        upcoming_only: bool,
    ) -> Result<Vec<Fixture>, FplError> {
        let team_id = validate_id("team", team_id)?;
        let all = self.get_all().await?;
        Ok(all
            .iter()
            .filter(|f| f.involves(team_id) && !(upcoming_only && f.finished))
            .cloned()
            .collect())
    }

    /// Unfinished fixtures in the next `num_gameweeks` gameweeks that still
    /// have matches to play.
    pub async fn get_upcoming(&self, num_gameweeks: usize) -> Result<Vec<Fixture>, FplError> {
        if num_gameweeks == 0 {
            return Err(FplError::invalid_input(
                "number of gameweeks must be at least 1",
            ));
        }
        let all = self.get_all().await?;
        let pending = all.iter().filter(|f| !f.finished);
        let window: BTreeSet<u8> = pending
            .clone()
            .filter_map(|f| f.gameweek)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .take(num_gameweeks)
            .collect();
        Ok(pending
            .filter(|f| f.gameweek.is_some_and(|gw| window.contains(&gw)))
            .cloned()
            .collect())
    }
}
