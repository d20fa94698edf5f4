//! # FPL Data
//!
//! Cached, retrying data-access layer for the public Fantasy Premier League
//! API.
//!
//! ## Overview
//!
//! - **Unified client** that deduplicates concurrent fetches of one resource
//! - **Time-bounded cache** keyed by resource identity
//! - **Fixed retry policy** that only retries transient failures
//! - **Domain readers** for the season snapshot, managers, players and fixtures
//! - **Normalized records**; upstream JSON never reaches callers
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Cache keys, modes and the TTL store |
//! | [`client`] | [`FplClient`] and its builder |
//! | [`config`] | Client configuration and environment loading |
//! | [`domain`] | Normalized domain records |
//! | [`error`] | [`FplError`] and its classification |
//! | [`http_client`] | HTTP abstraction, transport and offline stub |
//! | [`readers`] | Bootstrap, manager, player and fixtures readers |
//! | [`retry`] | Fixed-attempt retry policy |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fpl_data::FplClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fpl_data::FplError> {
//!     let client = FplClient::from_env();
//!
//!     let salah = client.players().get_detail_by_name("Salah").await?;
//!     println!("{} scored {} in the last five", salah.player.web_name, salah.recent_points());
//!
//!     for fixture in client.fixtures().get_by_team(12, true).await?.iter().take(3) {
//!         println!("GW{:?}: {} v {}", fixture.gameweek, fixture.home_team, fixture.away_team);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Caller         │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Domain Readers  │  validate input, build cache keys
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ FplClient       │────▶│ CacheStore       │
//! │ (single-flight) │     └──────────────────┘
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ RetryPolicy     │────▶│ Transport        │
//! └─────────────────┘     │ (HttpClient)     │
//!                         └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`FplError`]. Callers branch on [`ErrorKind`]:
//!
//! ```rust
//! use fpl_data::{ErrorKind, FplError};
//!
//! fn describe(error: &FplError) -> String {
//!     match error.kind() {
//!         ErrorKind::AmbiguousMatch => format!("did you mean one of {:?}?", error.candidates()),
//!         ErrorKind::NotFound => String::from("no such record"),
//!         ErrorKind::RetryExhausted => String::from("upstream unavailable, try later"),
//!         _ => error.to_string(),
//!     }
//! }
//! ```

pub(crate) mod api_types;
pub mod cache;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod readers;
pub mod retry;

// Client
pub use client::{FplClient, FplClientBuilder};

// Caching
pub use cache::{CacheEntry, CacheKey, CacheMode, CacheStore};

// Configuration
pub use config::{
    ClientConfig, DEFAULT_BASE_URL, DEFAULT_CACHE_TTL, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY,
};

// Domain models
pub use domain::{
    BootstrapSnapshot, ChipUsage, Fixture, FixtureScore, GameweekInfo, GameweekPicks,
    GameweekResult, GameweekStats, GameweekStatus, LivePlayerStats, ManagerProfile,
    ManagerSummary, Payload, Pick, Player, PlayerRecord, PlayerSummary, Position, SeasonProgress,
    SeasonStats, Team, Transfer, UpcomingFixture, SEASON_GAMEWEEKS,
};

// Error types
pub use error::{ErrorKind, FplError, PlayerCandidate};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, StubHttpClient,
    StubReply, Transport,
};

// Readers
pub use readers::{
    resolve_player_name, BootstrapReader, FixturesReader, ManagerReader, PlayerReader,
};

// Retry
pub use retry::RetryPolicy;
