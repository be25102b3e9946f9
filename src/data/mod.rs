pub mod cache;
pub mod names;
pub mod schema;
pub mod season_file;
pub mod statcast;
pub mod store;

use std::collections::HashMap;

use anyhow::Result;

use crate::types::{PitchEvent, PlayerName};

pub use cache::CachedSource;
pub use names::{ChadwickRegister, InMemoryNames, StatsApiClient};
pub use season_file::SeasonFiles;
pub use statcast::StatcastClient;
pub use store::SqliteStore;

/// Anything that can supply a season's flat pitch-event table.
pub trait PitchSource {
    fn fetch_season(&self, season: i32) -> Result<Vec<PitchEvent>>;
}

/// Maps MLBAM batter ids to names. Ids with no match are absent from the result.
pub trait NameResolver {
    fn resolve(&self, ids: &[u32]) -> Result<HashMap<u32, PlayerName>>;
}

/// Sorted, de-duplicated copy of `ids` so lookups are issued in a stable order.
pub(crate) fn sorted_ids(ids: &[u32]) -> Vec<u32> {
    let mut out = ids.to_vec();
    out.sort_unstable();
    out.dedup();
    out
}
