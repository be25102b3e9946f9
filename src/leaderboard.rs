//! Read-only view over a precomputed season table.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::data::season_file::{export_rows, SeasonFiles};
use crate::types::SeasonRow;

/// Rows shown in each leaderboard.
pub const DEFAULT_LEADERBOARD_SIZE: usize = 20;

/// Allowed minimum-PA filter values.
pub const MIN_PA_RANGE: RangeInclusive<u32> = 50..=600;

/// A season table filtered to batters with at least `min_pa` plate appearances.
///
/// Row order is the table's order: CAB+ descending, undefined values last.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    season: i32,
    min_pa: u32,
    rows: Vec<SeasonRow>,
}

impl Leaderboard {
    pub fn new(season: i32, min_pa: u32, rows: Vec<SeasonRow>) -> Self {
        let rows = rows.into_iter().filter(|r| r.total_pa >= min_pa).collect();
        Self {
            season,
            min_pa,
            rows,
        }
    }

    pub fn load(files: &SeasonFiles, season: i32, min_pa: u32) -> Result<Self> {
        Ok(Self::new(season, min_pa, files.read(season)?))
    }

    pub fn season(&self) -> i32 {
        self.season
    }

    pub fn min_pa(&self) -> u32 {
        self.min_pa
    }

    pub fn rows(&self) -> &[SeasonRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First `n` rows.
    pub fn top(&self, n: usize) -> &[SeasonRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Last `n` rows, in table order.
    pub fn bottom(&self, n: usize) -> &[SeasonRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }

    /// Case-insensitive substring match on player name. A blank query matches nothing.
    pub fn search(&self, query: &str) -> Vec<&SeasonRow> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.rows
            .iter()
            .filter(|r| r.player_name.to_lowercase().contains(&needle))
            .collect()
    }

    /// e.g. `CAB2023_min200.csv`
    pub fn export_file_name(&self) -> String {
        format!("CAB{}_min{}.csv", self.season, self.min_pa)
    }

    /// Write the filtered table. A directory target gets [`export_file_name`](Self::export_file_name).
    pub fn export(&self, target: &Path) -> Result<PathBuf> {
        let path = if target.is_dir() {
            target.join(self.export_file_name())
        } else {
            target.to_path_buf()
        };
        export_rows(&self.rows, &path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_row(name: &str, total_pa: u32, cab_plus: Option<f64>) -> SeasonRow {
        SeasonRow {
            player_name: name.to_string(),
            total_pa,
            uab: total_pa / 4,
            cab: total_pa - total_pa / 4,
            uab_rate: 25.0,
            cab_rate: 75.0,
            cab_plus,
        }
    }

    fn sample() -> Vec<SeasonRow> {
        vec![
            make_row("Freddie Freeman", 700, Some(140.2)),
            make_row("Aaron Judge", 650, Some(131.0)),
            make_row("Bench Guy", 120, Some(125.0)),
            make_row("Juan Soto", 690, Some(118.4)),
            make_row("Luis Arraez", 610, Some(99.9)),
            make_row("", 400, Some(80.0)),
            make_row("Javier Báez", 560, Some(61.3)),
            make_row("Zero Strikeouts", 210, None),
        ]
    }

    #[test]
    fn test_min_pa_filter() {
        let lb = Leaderboard::new(2023, 200, sample());
        assert_eq!(lb.rows().len(), 7);
        assert!(lb.rows().iter().all(|r| r.total_pa >= 200));

        let strict = Leaderboard::new(2023, 600, sample());
        assert_eq!(strict.rows().len(), 4);
    }

    #[test]
    fn test_top_and_bottom() {
        let lb = Leaderboard::new(2023, 200, sample());
        let top: Vec<&str> = lb.top(2).iter().map(|r| r.player_name.as_str()).collect();
        assert_eq!(top, vec!["Freddie Freeman", "Aaron Judge"]);

        let bottom: Vec<&str> = lb.bottom(2).iter().map(|r| r.player_name.as_str()).collect();
        assert_eq!(bottom, vec!["Javier Báez", "Zero Strikeouts"]);

        assert_eq!(lb.top(50).len(), 7);
        assert_eq!(lb.bottom(50).len(), 7);
    }

    #[test]
    fn test_search_case_insensitive() {
        let lb = Leaderboard::new(2023, 200, sample());
        let hits = lb.search("  jUaN ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].player_name, "Juan Soto");

        let hits = lb.search("báez");
        assert_eq!(hits.len(), 1);

        // Aaron and Arraez.
        assert_eq!(lb.search("AR").len(), 2);
    }

    #[test]
    fn test_search_misses() {
        let lb = Leaderboard::new(2023, 200, sample());
        assert!(lb.search("Mays").is_empty());
        assert!(lb.search("   ").is_empty());
        // Filtered out by min PA.
        assert!(lb.search("bench").is_empty());
    }

    #[test]
    fn test_export_file_name_and_contents() {
        let tmp = TempDir::new().unwrap();
        let lb = Leaderboard::new(2022, 300, sample());
        assert_eq!(lb.export_file_name(), "CAB2022_min300.csv");

        let path = lb.export(tmp.path()).unwrap();
        assert_eq!(path, tmp.path().join("CAB2022_min300.csv"));

        let back = crate::data::season_file::read_rows(&path).unwrap();
        assert_eq!(back, lb.rows());
    }

    #[test]
    fn test_load_from_season_files() {
        let tmp = TempDir::new().unwrap();
        let files = SeasonFiles::new(tmp.path());
        files.write(2024, &sample()).unwrap();

        let lb = Leaderboard::load(&files, 2024, 650).unwrap();
        assert_eq!(lb.season(), 2024);
        assert_eq!(lb.min_pa(), 650);
        assert_eq!(lb.rows().len(), 3);
        assert!(Leaderboard::load(&files, 2019, 200).is_err());
    }
}
