//! In-memory, time-bounded cache of normalized upstream resources.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::time::Instant;

/// Identifies one logical upstream query.
///
/// Keys are compared structurally, so two queries collide only when they are
/// the same query. [`Display`] renders the stable string form used in logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Bootstrap,
    Manager { team_id: u32 },
    ManagerPicks { team_id: u32, gameweek: u8 },
    PlayerSummary { player_id: u32 },
    Fixtures,
    FixturesByGameweek { gameweek: u8 },
    GameweekLive { gameweek: u8 },
}

impl CacheKey {
    pub const fn domain(&self) -> &'static str {
        match self {
            Self::Bootstrap => "bootstrap",
            Self::Manager { .. } | Self::ManagerPicks { .. } => "manager",
            Self::PlayerSummary { .. } | Self::GameweekLive { .. } => "player",
            Self::Fixtures | Self::FixturesByGameweek { .. } => "fixtures",
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bootstrap => f.write_str("bootstrap:static"),
            Self::Manager { team_id } => write!(f, "manager:{team_id}"),
            Self::ManagerPicks { team_id, gameweek } => {
                write!(f, "manager:{team_id}:picks?gameweek={gameweek}")
            }
            Self::PlayerSummary { player_id } => write!(f, "player:{player_id}:summary"),
            Self::Fixtures => f.write_str("fixtures:all"),
            Self::FixturesByGameweek { gameweek } => write!(f, "fixtures:all?gameweek={gameweek}"),
            Self::GameweekLive { gameweek } => write!(f, "player:live?gameweek={gameweek}"),
        }
    }
}

/// How a read interacts with the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Serve a fresh entry if present; otherwise fetch and store.
    #[default]
    Use,
    /// Skip the cached entry, fetch, and store the result.
    Refresh,
    /// Fetch without reading or writing the cache.
    Bypass,
}

impl CacheMode {
    pub const fn reads(self) -> bool {
        matches!(self, Self::Use)
    }

    pub const fn writes(self) -> bool {
        matches!(self, Self::Use | Self::Refresh)
    }
}

/// A stored payload and the instant it was fetched.
///
/// Entries are replaced wholesale; the payload is never patched in place.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub key: CacheKey,
    pub payload: V,
    pub fetched_at: Instant,
}

impl<V> CacheEntry<V> {
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}

/// Thread-safe map from [`CacheKey`] to [`CacheEntry`] with a fixed
/// freshness window.
///
/// Stale entries stay in the map until overwritten or invalidated so they can
/// be inspected with [`peek`](Self::peek), but [`get`](Self::get) never
/// returns them. There is no capacity bound.
#[derive(Debug, Clone)]
pub struct CacheStore<V> {
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry<V>>>>,
    ttl: Duration,
}

impl<V: Clone> CacheStore<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// A store that never holds entries; the client bypasses it entirely.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_disabled(&self) -> bool {
        self.ttl.is_zero()
    }

    /// Fresh entry for `key`, or `None` on a miss or a stale entry.
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry<V>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(self.ttl))
            .cloned()
    }

    /// Entry for `key` regardless of freshness.
    pub fn peek(&self, key: &CacheKey) -> Option<CacheEntry<V>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    /// Store `payload` under `key`, stamped with the current instant.
    ///
    /// A disabled store ignores writes.
    pub fn put(&self, key: CacheKey, payload: V) {
        if self.is_disabled() {
            return;
        }
        let entry = CacheEntry {
            key: key.clone(),
            payload,
            fetched_at: Instant::now(),
        };
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, entry);
    }

    pub fn invalidate(&self, key: &CacheKey) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }

    /// Number of entries, including stale ones.
    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(15 * 60);

    #[test]
    fn keys_render_distinct_strings() {
        let keys = [
            CacheKey::Bootstrap,
            CacheKey::Manager { team_id: 1 },
            CacheKey::ManagerPicks {
                team_id: 1,
                gameweek: 1,
            },
            CacheKey::PlayerSummary { player_id: 1 },
            CacheKey::Fixtures,
            CacheKey::FixturesByGameweek { gameweek: 1 },
            CacheKey::GameweekLive { gameweek: 1 },
        ];

        let rendered: std::collections::HashSet<String> =
            keys.iter().map(ToString::to_string).collect();
        assert_eq!(rendered.len(), keys.len());
        assert_eq!(
            CacheKey::FixturesByGameweek { gameweek: 7 }.to_string(),
            CacheKey::FixturesByGameweek { gameweek: 7 }.to_string()
        );
    }

    #[test]
    fn cache_modes_read_and_write_as_documented() {
        assert!(CacheMode::Use.reads() && CacheMode::Use.writes());
        assert!(!CacheMode::Refresh.reads() && CacheMode::Refresh.writes());
        assert!(!CacheMode::Bypass.reads() && !CacheMode::Bypass.writes());
        assert_eq!(CacheMode::default(), CacheMode::Use);
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_entry_is_served_and_overwritten_wholesale() {
        let cache = CacheStore::new(TTL);
        let key = CacheKey::Manager { team_id: 42 };

        assert!(cache.get(&key).is_none());

        cache.put(key.clone(), String::from("first"));
        assert_eq!(cache.get(&key).map(|e| e.payload), Some(String::from("first")));

        cache.put(key.clone(), String::from("second"));
        assert_eq!(cache.get(&key).map(|e| e.payload), Some(String::from("second")));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_entry_is_a_miss_but_remains_inspectable() {
        let cache = CacheStore::new(TTL);
        let key = CacheKey::Fixtures;
        cache.put(key.clone(), 1_u32);

        tokio::time::advance(TTL - Duration::from_secs(1)).await;
        assert!(cache.get(&key).is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get(&key).is_none(), "entry at exactly the window is stale");

        let stale = cache.peek(&key).expect("stale entry is retained");
        assert_eq!(stale.payload, 1);
        assert_eq!(stale.age(), TTL);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_and_clear_remove_entries() {
        let cache = CacheStore::new(Duration::from_secs(10));
        cache.put(CacheKey::Bootstrap, "snapshot");
        cache.put(CacheKey::Fixtures, "fixtures");

        assert!(cache.invalidate(&CacheKey::Bootstrap));
        assert!(!cache.invalidate(&CacheKey::Bootstrap));
        assert_eq!(cache.len(), 1);

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(cache.len(), 1, "expired entries stay until removed");
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn disabled_store_never_holds_entries() {
        let cache = CacheStore::disabled();
        cache.put(CacheKey::Bootstrap, 1);

        assert!(cache.is_disabled());
        assert!(cache.get(&CacheKey::Bootstrap).is_none());
        assert_eq!(cache.len(), 0);
    }
}
