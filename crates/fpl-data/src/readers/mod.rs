//! Domain readers.
//!
//! Each reader turns typed queries into [`CacheKey`](crate::CacheKey)s and
//! fetchers, hands both to [`FplClient::resolve`](crate::FplClient::resolve),
//! and returns normalized records.
//!
//! | Reader | Upstream resources |
//! |--------|--------------------|
//! | [`BootstrapReader`] | `bootstrap-static/` |
//! | [`ManagerReader`] | `entry/{id}/` with its `history/`, `transfers/` and `event/{gw}/picks/` |
//! | [`PlayerReader`] | `element-summary/{id}/`, `event/{gw}/live/` |
//! | [`FixturesReader`] | `fixtures/` |

mod bootstrap;
mod fixtures;
mod manager;
mod player;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

pub use bootstrap::BootstrapReader;
pub use fixtures::FixturesReader;
pub use manager::ManagerReader;
pub use player::{resolve_player_name, PlayerReader};

use crate::error::FplError;
use crate::http_client::Transport;

pub(crate) type FetchFuture<T> = Pin<Box<dyn Future<Output = Result<T, FplError>> + Send>>;

/// Fetcher that GETs one resource and normalizes it.
pub(crate) fn fetch_json<T, N>(
    transport: &Transport,
    path: String,
    params: Vec<(&'static str, String)>,
    normalize: N,
) -> impl Fn() -> FetchFuture<T> + Send + Sync + 'static
where
    T: Send + 'static,
    N: Fn(Value) -> Result<T, FplError> + Send + Sync + 'static,
{
    let transport = transport.clone();
    let normalize = Arc::new(normalize);
    move || {
        let transport = transport.clone();
        let path = path.clone();
        let params = params.clone();
        let normalize = Arc::clone(&normalize);
        Box::pin(async move {
            let value = transport.fetch(&path, &params).await?;
            normalize(value)
        })
    }
}

/// Turn an upstream 404 into [`FplError::NotFound`] for `resource`.
pub(crate) fn not_found_on_404(error: FplError, resource: impl FnOnce() -> String) -> FplError {
    match error {
        FplError::HttpStatus { status: 404, .. } => FplError::not_found(resource()),
        other => other,
    }
}
