use anyhow::{Context, Result};
use tracing::info;

use crate::types::PitchEvent;

use super::store::SqliteStore;
use super::PitchSource;

/// Serves seasons from a [`SqliteStore`], fetching and storing misses from `inner`.
pub struct CachedSource<S> {
    inner: S,
    store: SqliteStore,
    refresh: bool,
}

impl<S: PitchSource> CachedSource<S> {
    pub fn new(inner: S, store: SqliteStore) -> Self {
        Self {
            inner,
            store,
            refresh: false,
        }
    }

    /// Always re-fetch from `inner`, replacing the cached copy.
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }
}

impl<S: PitchSource> PitchSource for CachedSource<S> {
    fn fetch_season(&self, season: i32) -> Result<Vec<PitchEvent>> {
        if !self.refresh && self.store.has_season(season)? {
            let pitches = self.store.load_season(season)?;
            info!(season, rows = pitches.len(), "loaded season from cache");
            return Ok(pitches);
        }

        let pitches = self.inner.fetch_season(season)?;
        self.store
            .replace_season(season, &pitches)
            .with_context(|| format!("failed to cache season {}", season))?;
        Ok(pitches)
    }
}
