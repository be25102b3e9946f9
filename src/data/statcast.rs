//! Statcast pitch-level data: Baseball Savant CSV search and local CSV files.
//!
//! A season is pulled in fixed calendar windows (April through October 10th),
//! one request per day since Savant truncates large responses.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::types::PitchEvent;

use super::PitchSource;

const SAVANT_SEARCH_URL: &str = "https://baseballsavant.mlb.com/statcast_search/csv";

// ---------------------------------------------------------------------------
// CSV row schema
// ---------------------------------------------------------------------------

/// The Statcast columns the pipeline reads. Savant returns ~90 more; they are ignored.
#[derive(Debug, Deserialize)]
pub struct StatcastRow {
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub game_pk: Option<u64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub at_bat_number: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub batter: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub pitch_number: Option<u32>,
    #[serde(default)]
    pub events: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub launch_speed: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub estimated_woba_using_speedangle: Option<f64>,
}

/// Convert one CSV row into a [`PitchEvent`].
///
/// Returns `None` when any key column is missing.
pub fn map_row(row: StatcastRow) -> Option<PitchEvent> {
    let events = row
        .events
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty() && e != "null");

    Some(PitchEvent {
        game_pk: row.game_pk?,
        at_bat_number: row.at_bat_number?,
        batter: row.batter?,
        pitch_number: row.pitch_number?,
        events,
        launch_speed: row.launch_speed.filter(|v| v.is_finite()),
        estimated_woba: row.estimated_woba_using_speedangle.filter(|v| v.is_finite()),
    })
}

/// Rows read from one CSV payload.
#[derive(Debug, Default)]
pub struct ParsedPitches {
    pub pitches: Vec<PitchEvent>,
    /// Rows dropped for missing key columns.
    pub skipped: usize,
}

impl ParsedPitches {
    /// Append another payload's pitches and skipped count.
    pub fn absorb(&mut self, other: ParsedPitches) {
        self.skipped += other.skipped;
        self.pitches.extend(other.pitches);
    }
}

/// Parse Statcast-format CSV from any reader.
pub fn read_pitch_csv<R: Read>(reader: R) -> Result<ParsedPitches> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut out = ParsedPitches::default();

    for row in rdr.deserialize::<StatcastRow>() {
        // csv errors carry their own record/line position.
        let row = row.context("bad Statcast row")?;
        match map_row(row) {
            Some(p) => out.pitches.push(p),
            None => out.skipped += 1,
        }
    }
    Ok(out)
}

/// Parse a Statcast CSV file from disk.
pub fn read_pitch_file(path: &Path) -> Result<ParsedPitches> {
    let file = fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_pitch_csv(file).with_context(|| format!("failed to parse {}", path.display()))
}

// ---------------------------------------------------------------------------
// Season windows
// ---------------------------------------------------------------------------

/// (month, first day, last day) of each fetch window.
const WINDOWS: [(u32, u32, u32); 7] = [
    (4, 1, 30),
    (5, 1, 31),
    (6, 1, 30),
    (7, 1, 31),
    (8, 1, 31),
    (9, 1, 30),
    (10, 1, 10),
];

/// Inclusive date ranges covering a season.
pub fn season_windows(season: i32) -> Result<Vec<(NaiveDate, NaiveDate)>> {
    WINDOWS
        .iter()
        .map(|&(month, first, last)| {
            let start = NaiveDate::from_ymd_opt(season, month, first);
            let end = NaiveDate::from_ymd_opt(season, month, last);
            start
                .zip(end)
                .with_context(|| format!("invalid fetch window {}-{:02}", season, month))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Savant client
// ---------------------------------------------------------------------------

/// Blocking client for the Savant Statcast search.
pub struct StatcastClient {
    base_url: String,
}

impl Default for StatcastClient {
    fn default() -> Self {
        Self::new(SAVANT_SEARCH_URL)
    }
}

impl StatcastClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Search URL for a single date range.
    pub fn search_url(&self, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}?all=true&hfGT=R%7CPO%7CS%7C&player_type=pitcher&game_date_gt={}&game_date_lt={}\
             &min_pitches=0&min_results=0&group_by=name&sort_col=pitches\
             &player_event_sort=h_launch_speed&sort_order=desc&min_abs=0&type=details",
            self.base_url,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
        )
    }

    /// Fetch one day of pitches.
    pub fn fetch_day(&self, day: NaiveDate) -> Result<ParsedPitches> {
        let url = self.search_url(day, day);
        let resp = ureq::get(&url)
            .call()
            .with_context(|| format!("Statcast request failed for {}", day))?;
        read_pitch_csv(resp.into_reader())
            .with_context(|| format!("failed to parse Statcast CSV for {}", day))
    }

    /// Fetch every day in `[start, end]` and concatenate.
    pub fn fetch_range(&self, start: NaiveDate, end: NaiveDate) -> Result<ParsedPitches> {
        let mut out = ParsedPitches::default();
        for day in start.iter_days().take_while(|d| *d <= end) {
            let parsed = self.fetch_day(day)?;
            if parsed.pitches.is_empty() {
                debug!(%day, skipped = parsed.skipped, "no pitches");
            }
            out.absorb(parsed);
        }
        Ok(out)
    }
}

impl PitchSource for StatcastClient {
    fn fetch_season(&self, season: i32) -> Result<Vec<PitchEvent>> {
        let mut pitches = Vec::new();
        let mut skipped = 0usize;

        for (start, end) in season_windows(season)? {
            info!("fetching {} -> {}", start, end);
            let window = self.fetch_range(start, end)?;
            info!("  rows: {}", window.pitches.len());
            skipped += window.skipped;
            pitches.extend(window.pitches);
        }

        if skipped > 0 {
            warn!(season, skipped, "dropped Statcast rows missing key columns");
        }
        info!(season, rows = pitches.len(), "fetched season");
        Ok(pitches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "pitch_type,game_date,batter,pitcher,events,description,launch_speed,game_pk,at_bat_number,pitch_number,estimated_woba_using_speedangle";

    fn csv_of(lines: &[&str]) -> String {
        let mut s = String::from(HEADER);
        for l in lines {
            s.push('\n');
            s.push_str(l);
        }
        s.push('\n');
        s
    }

    #[test]
    fn test_read_basic_rows() {
        let data = csv_of(&[
            "FF,2023-06-01,592450,543037,strikeout,swinging_strike,,717465,34,3,",
            "SL,2023-06-01,592450,543037,,ball,,717465,34,2,",
            "FF,2023-06-01,660271,543037,single,hit_into_play,101.2,717465,35,5,0.612",
        ]);
        let parsed = read_pitch_csv(data.as_bytes()).unwrap();
        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.pitches.len(), 3);

        let k = &parsed.pitches[0];
        assert_eq!(k.batter, 592450);
        assert_eq!(k.game_pk, 717465);
        assert_eq!(k.at_bat_number, 34);
        assert_eq!(k.pitch_number, 3);
        assert_eq!(k.events.as_deref(), Some("strikeout"));
        assert_eq!(k.launch_speed, None);

        assert_eq!(parsed.pitches[1].events, None);

        let hit = &parsed.pitches[2];
        assert_eq!(hit.launch_speed, Some(101.2));
        assert_eq!(hit.estimated_woba, Some(0.612));
    }

    #[test]
    fn test_missing_key_columns_are_skipped() {
        let data = csv_of(&[
            "FF,2023-06-01,,543037,single,hit_into_play,95.0,717465,35,5,0.5",
            "FF,2023-06-01,592450,543037,single,hit_into_play,95.0,717465,35,,0.5",
            "FF,2023-06-01,592450,543037,single,hit_into_play,95.0,717465,36,1,0.5",
        ]);
        let parsed = read_pitch_csv(data.as_bytes()).unwrap();
        assert_eq!(parsed.skipped, 2);
        assert_eq!(parsed.pitches.len(), 1);
    }

    #[test]
    fn test_null_markers_become_missing() {
        let data = csv_of(&["FF,2023-06-01,592450,543037,null,ball,null,717465,35,1,NaN"]);
        let parsed = read_pitch_csv(data.as_bytes()).unwrap();
        let p = &parsed.pitches[0];
        assert_eq!(p.events, None);
        assert_eq!(p.launch_speed, None);
        assert_eq!(p.estimated_woba, None);
    }

    #[test]
    fn test_empty_payload() {
        let parsed = read_pitch_csv(HEADER.as_bytes()).unwrap();
        assert!(parsed.pitches.is_empty());
        let parsed = read_pitch_csv("".as_bytes()).unwrap();
        assert!(parsed.pitches.is_empty());
    }

    #[test]
    fn test_season_windows() {
        let w = season_windows(2023).unwrap();
        assert_eq!(w.len(), 7);
        assert_eq!(w[0].0, NaiveDate::from_ymd_opt(2023, 4, 1).unwrap());
        assert_eq!(w[0].1, NaiveDate::from_ymd_opt(2023, 4, 30).unwrap());
        assert_eq!(w[6].1, NaiveDate::from_ymd_opt(2023, 10, 10).unwrap());
    }

    #[test]
    fn test_search_url() {
        let client = StatcastClient::new("http://localhost/csv");
        let day = NaiveDate::from_ymd_opt(2023, 7, 4).unwrap();
        let url = client.search_url(day, day);
        assert!(url.starts_with("http://localhost/csv?all=true"));
        assert!(url.contains("game_date_gt=2023-07-04&game_date_lt=2023-07-04"));
        assert!(url.contains("type=details"));
        assert!(!url.contains(' '));
    }

    #[test]
    fn test_read_pitch_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("statcast.csv");
        fs::write(&path, csv_of(&["FF,2023-06-01,1,2,walk,ball,,10,1,4,"])).unwrap();
        let parsed = read_pitch_file(&path).unwrap();
        assert_eq!(parsed.pitches.len(), 1);
        assert!(read_pitch_file(&tmp.path().join("missing.csv")).is_err());
    }

    #[test]
    fn test_absorb_counts_skipped_from_empty_day() {
        let mut total = read_pitch_csv(
            csv_of(&["FF,2023-06-01,592450,543037,single,hit_into_play,99.0,717465,35,5,0.5"])
                .as_bytes(),
        )
        .unwrap();

        // Every row of this day lacks a game_pk.
        let empty_day = read_pitch_csv(
            csv_of(&[
                "FF,2023-06-02,592450,543037,strikeout,swinging_strike,,,1,3,",
                "SL,2023-06-02,592450,543037,,ball,,,1,2,",
            ])
            .as_bytes(),
        )
        .unwrap();
        assert!(empty_day.pitches.is_empty());
        assert_eq!(empty_day.skipped, 2);

        total.absorb(empty_day);
        assert_eq!(total.pitches.len(), 1);
        assert_eq!(total.skipped, 2);
    }

    #[test]
    fn test_bad_row_error_uses_csv_position() {
        let mut data = csv_of(&[
            "FF,2023-06-01,592450,543037,single,\"hit\ninto play\",99.0,717465,35,5,0.5",
        ])
        .into_bytes();
        data.extend_from_slice(b"FF,2023-06-01,592450,543037,\xff\xfe,ball,,717465,36,1,\n");

        let err = read_pitch_csv(data.as_slice()).unwrap_err();
        assert_eq!(err.to_string(), "bad Statcast row");
        assert!(format!("{:#}", err).contains("(line 4,"));
    }
}
