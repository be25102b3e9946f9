//! Batter identity lookup.
//!
//! Two real backends: the Chadwick Bureau person register (CSV, local or
//! downloaded) and the MLB Stats API `people` endpoint. [`InMemoryNames`] is
//! a plain map for tests and pre-resolved data.

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::types::PlayerName;

use super::{sorted_ids, NameResolver};

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct InMemoryNames {
    names: HashMap<u32, PlayerName>,
}

impl InMemoryNames {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, PlayerName)>) -> Self {
        Self {
            names: pairs.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, id: u32, name: PlayerName) {
        self.names.insert(id, name);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl NameResolver for InMemoryNames {
    fn resolve(&self, ids: &[u32]) -> Result<HashMap<u32, PlayerName>> {
        Ok(sorted_ids(ids)
            .into_iter()
            .filter_map(|id| self.names.get(&id).map(|n| (id, n.clone())))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Chadwick register
// ---------------------------------------------------------------------------

const CHADWICK_BASE_URL: &str =
    "https://raw.githubusercontent.com/chadwickbureau/register/master/data";

/// The register is split into `people-0.csv` .. `people-f.csv`.
const CHADWICK_SHARDS: &str = "0123456789abcdef";

/// Columns of the register we care about; the rest are ignored.
#[derive(Debug, Deserialize)]
struct RegisterRow {
    #[serde(default, deserialize_with = "csv::invalid_option")]
    key_mlbam: Option<u32>,
    #[serde(default)]
    name_first: Option<String>,
    #[serde(default)]
    name_last: Option<String>,
}

/// Chadwick Bureau register keyed by MLBAM id.
#[derive(Debug, Default)]
pub struct ChadwickRegister {
    people: InMemoryNames,
}

impl ChadwickRegister {
    /// Parse register CSV, merging into the existing map.
    pub fn load_reader<R: Read>(&mut self, reader: R) -> Result<usize> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut loaded = 0usize;
        for row in rdr.deserialize::<RegisterRow>() {
            let row = row.context("bad register row")?;
            let Some(id) = row.key_mlbam else {
                continue;
            };
            self.people.insert(
                id,
                PlayerName {
                    first: row.name_first,
                    last: row.name_last,
                },
            );
            loaded += 1;
        }
        Ok(loaded)
    }

    /// Load from a register CSV file, or every `*.csv` in a directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut reg = Self::default();
        let files = if path.is_dir() {
            let mut files: Vec<_> = fs::read_dir(path)
                .with_context(|| format!("failed to read dir {}", path.display()))?
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
                .collect();
            files.sort();
            files
        } else {
            vec![path.to_path_buf()]
        };

        for f in &files {
            let file =
                fs::File::open(f).with_context(|| format!("failed to open {}", f.display()))?;
            let n = reg
                .load_reader(file)
                .with_context(|| format!("failed to parse register {}", f.display()))?;
            debug!(file = %f.display(), people = n, "loaded register file");
        }
        info!("loaded {} register entries", reg.people.len());
        Ok(reg)
    }

    /// Download all register shards.
    pub fn fetch() -> Result<Self> {
        let mut reg = Self::default();
        for shard in CHADWICK_SHARDS.chars() {
            let url = format!("{}/people-{}.csv", CHADWICK_BASE_URL, shard);
            let resp = ureq::get(&url)
                .call()
                .with_context(|| format!("register request failed for {}", url))?;
            let n = reg
                .load_reader(resp.into_reader())
                .with_context(|| format!("failed to parse register shard {}", url))?;
            debug!(shard = %shard, people = n, "fetched register shard");
        }
        info!("fetched {} register entries", reg.people.len());
        Ok(reg)
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}

impl NameResolver for ChadwickRegister {
    fn resolve(&self, ids: &[u32]) -> Result<HashMap<u32, PlayerName>> {
        self.people.resolve(ids)
    }
}

// ---------------------------------------------------------------------------
// MLB Stats API
// ---------------------------------------------------------------------------

const STATS_API_URL: &str = "https://statsapi.mlb.com/api/v1/people";
const STATS_API_BATCH: usize = 100;

#[derive(Debug, Deserialize)]
struct PeopleResponse {
    #[serde(default)]
    people: Vec<Person>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Person {
    id: u32,
    first_name: Option<String>,
    last_name: Option<String>,
}

/// Resolves names through `statsapi.mlb.com`.
pub struct StatsApiClient {
    base_url: String,
}

impl Default for StatsApiClient {
    fn default() -> Self {
        Self::new(STATS_API_URL)
    }
}

impl StatsApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn batch_url(&self, ids: &[u32]) -> String {
        let joined: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        format!("{}?personIds={}", self.base_url, joined.join(","))
    }
}

fn parse_people(body: &str) -> Result<HashMap<u32, PlayerName>> {
    let resp: PeopleResponse =
        serde_json::from_str(body).context("failed to parse Stats API people JSON")?;
    Ok(resp
        .people
        .into_iter()
        .map(|p| {
            (
                p.id,
                PlayerName {
                    first: p.first_name,
                    last: p.last_name,
                },
            )
        })
        .collect())
}

impl NameResolver for StatsApiClient {
    fn resolve(&self, ids: &[u32]) -> Result<HashMap<u32, PlayerName>> {
        let ids = sorted_ids(ids);
        let mut out = HashMap::with_capacity(ids.len());

        for chunk in ids.chunks(STATS_API_BATCH) {
            let url = self.batch_url(chunk);
            let body: String = ureq::get(&url)
                .call()
                .with_context(|| format!("Stats API request failed: {}", url))?
                .into_string()
                .context("failed to read Stats API response body")?;
            out.extend(parse_people(&body)?);
        }

        debug!(requested = ids.len(), resolved = out.len(), "Stats API lookup");
        Ok(out)
    }
}
