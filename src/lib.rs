//! CAB+ (Competitive At-Bat Ratio Plus).
//!
//! Turns Statcast pitch-level rows into plate appearances, labels each one
//! competitive or uncompetitive, and rolls the labels up into a
//! league-normalized per-batter score.

pub mod aggregate;
pub mod data;
pub mod error;
pub mod label;
pub mod leaderboard;
pub mod precompute;
pub mod report;
pub mod types;

pub use aggregate::{build_season_table, AggregateConfig, SeasonTable};
pub use error::CabError;
pub use label::label_uab;
