use anyhow::Result;
use rusqlite::Connection;
use tracing::debug;

use crate::types::PitchEvent;

use super::schema;
use super::PitchSource;

/// A season held in the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSeason {
    pub season: i32,
    /// RFC 3339 timestamp of when the season was stored.
    pub fetched_at: String,
    pub pitch_count: i64,
}

/// SQLite-backed pitch-event cache.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a file-backed database.
    pub fn open(path: &std::path::Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (useful for tests).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(schema::CREATE_PITCHES)?;
        self.conn.execute_batch(schema::CREATE_SEASONS)?;
        self.conn.execute_batch(schema::CREATE_INDEXES)?;
        Ok(())
    }

    /// Replace everything stored for `season` with `pitches` in one transaction.
    pub fn replace_season(&self, season: i32, pitches: &[PitchEvent]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM cab_pitches WHERE season = ?1", [season])?;
        {
            let mut stmt = tx.prepare_cached(schema::INSERT_PITCH)?;
            for p in pitches {
                stmt.execute(rusqlite::params![
                    season,
                    p.game_pk as i64,
                    p.at_bat_number,
                    p.batter,
                    p.pitch_number,
                    p.events,
                    p.launch_speed,
                    p.estimated_woba,
                ])?;
            }
        }
        tx.execute(
            "INSERT OR REPLACE INTO cab_seasons (season, fetched_at, pitch_count)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![season, chrono::Utc::now().to_rfc3339(), pitches.len() as i64],
        )?;
        tx.commit()?;
        debug!(season, pitches = pitches.len(), "cached season");
        Ok(())
    }

    pub fn has_season(&self, season: i32) -> Result<bool> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM cab_seasons WHERE season = ?1",
            [season],
            |row| row.get(0),
        )?;
        Ok(n > 0)
    }

    pub fn list_seasons(&self) -> Result<Vec<CachedSeason>> {
        let mut stmt = self.conn.prepare(schema::LIST_SEASONS)?;
        let rows = stmt.query_map([], |row| {
            Ok(CachedSeason {
                season: row.get(0)?,
                fetched_at: row.get(1)?,
                pitch_count: row.get(2)?,
            })
        })?;

        let mut seasons = Vec::new();
        for r in rows {
            seasons.push(r?);
        }
        Ok(seasons)
    }

    pub fn load_season(&self, season: i32) -> Result<Vec<PitchEvent>> {
        let mut stmt = self.conn.prepare(schema::LOAD_PITCHES)?;
        let pitches = stmt
            .query_map([season], |row| {
                Ok(PitchEvent {
                    game_pk: row.get::<_, i64>(0)? as u64,
                    at_bat_number: row.get(1)?,
                    batter: row.get(2)?,
                    pitch_number: row.get(3)?,
                    events: row.get(4)?,
                    launch_speed: row.get(5)?,
                    estimated_woba: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(pitches)
    }
}

impl PitchSource for SqliteStore {
    fn fetch_season(&self, season: i32) -> Result<Vec<PitchEvent>> {
        if !self.has_season(season)? {
            anyhow::bail!("season {} is not in the pitch cache", season);
        }
        self.load_season(season)
    }
}
