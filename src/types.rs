//! Core record types for the CAB+ pipeline.

use serde::{Deserialize, Serialize};

/// One pitch as delivered by the Statcast search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchEvent {
    /// Game identifier (`game_pk`).
    pub game_pk: u64,
    /// At-bat sequence number within the game.
    pub at_bat_number: u32,
    /// MLBAM batter identifier.
    pub batter: u32,
    /// Pitch sequence number within the at-bat, starting at 1.
    pub pitch_number: u32,
    /// Outcome recorded on the pitch that ended the at-bat (e.g. "strikeout").
    pub events: Option<String>,
    /// Exit velocity in mph.
    pub launch_speed: Option<f64>,
    /// `estimated_woba_using_speedangle`.
    pub estimated_woba: Option<f64>,
}

/// Grouping key for a plate appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaKey {
    pub game_pk: u64,
    pub at_bat_number: u32,
    pub batter: u32,
}

impl PitchEvent {
    pub fn pa_key(&self) -> PaKey {
        PaKey {
            game_pk: self.game_pk,
            at_bat_number: self.at_bat_number,
            batter: self.batter,
        }
    }
}

/// A plate appearance collapsed from its pitches.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateAppearance {
    pub game_pk: u64,
    pub at_bat_number: u32,
    pub batter: u32,
    /// Highest pitch number seen in the at-bat.
    pub pitch_number: u32,
    /// Outcome of the final pitch.
    pub events: Option<String>,
    /// Mean over the at-bat's pitches that carry a value.
    pub launch_speed: Option<f64>,
    /// Mean over the at-bat's pitches that carry a value.
    pub estimated_woba: Option<f64>,
}

/// Competitiveness of a single plate appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtBatLabel {
    Competitive,
    Uncompetitive,
}

impl AtBatLabel {
    /// 1 for an uncompetitive at-bat, else 0.
    pub fn uab(&self) -> u32 {
        match self {
            AtBatLabel::Uncompetitive => 1,
            AtBatLabel::Competitive => 0,
        }
    }

    /// Complement of [`uab`](Self::uab).
    pub fn cab(&self) -> u32 {
        1 - self.uab()
    }
}

/// First/last name pair returned by an identity lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerName {
    pub first: Option<String>,
    pub last: Option<String>,
}

impl PlayerName {
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: Some(first.into()),
            last: Some(last.into()),
        }
    }

    /// "First Last", dropping blank parts. Empty when both are blank.
    pub fn display_name(&self) -> String {
        [self.first.as_deref(), self.last.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Season totals for one batter.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerAggregate {
    pub batter: u32,
    pub player_name: String,
    pub total_pa: u32,
    pub uab: u32,
    pub cab: u32,
    /// Percent of PAs that were uncompetitive, 2 decimals.
    pub uab_rate: f64,
    /// Percent of PAs that were competitive, 2 decimals.
    pub cab_rate: f64,
    /// cab / uab; `None` when the batter has no uncompetitive at-bats.
    pub raw_ratio: Option<f64>,
    /// raw_ratio relative to the league ratio, x100, 1 decimal.
    pub cab_plus: Option<f64>,
}

/// One row of a persisted season table. Field order is the file's column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRow {
    pub player_name: String,
    pub total_pa: u32,
    pub uab: u32,
    pub cab: u32,
    pub uab_rate: f64,
    pub cab_rate: f64,
    #[serde(rename = "CAB+")]
    pub cab_plus: Option<f64>,
}

impl From<&PlayerAggregate> for SeasonRow {
    fn from(p: &PlayerAggregate) -> Self {
        Self {
            player_name: p.player_name.clone(),
            total_pa: p.total_pa,
            uab: p.uab,
            cab: p.cab,
            uab_rate: p.uab_rate,
            cab_rate: p.cab_rate,
            cab_plus: p.cab_plus,
        }
    }
}
