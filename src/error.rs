use std::path::PathBuf;

use thiserror::Error;

/// Domain errors surfaced by the CAB+ pipeline.
#[derive(Debug, Error)]
pub enum CabError {
    /// The league ratio's denominator is zero, so CAB+ is undefined for the season.
    #[error("season {season} has no uncompetitive at-bats; league ratio is undefined")]
    NoUncompetitiveAtBats { season: i32 },

    /// Every plate appearance was uncompetitive, so the league ratio is zero.
    #[error("season {season} has no competitive at-bats; league ratio is zero")]
    NoCompetitiveAtBats { season: i32 },

    #[error("invalid season '{arg}': must be a 4-digit year like 2022")]
    InvalidSeason { arg: String },

    #[error("no CAB+ tables found in {dir}; run `cabplus precompute <season>` first")]
    NoSeasonTables { dir: PathBuf },

    #[error("no CAB+ table for season {season} in {dir}")]
    SeasonNotFound { season: i32, dir: PathBuf },
}
