//! Season aggregation: pitches -> plate appearances -> per-batter CAB+.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::data::NameResolver;
use crate::error::CabError;
use crate::label::LabelRules;
use crate::types::{PaKey, PitchEvent, PlateAppearance, PlayerAggregate, SeasonRow};

/// Default minimum plate appearances for a batter to be listed.
pub const DEFAULT_MIN_PA: u32 = 200;

/// Knobs for building a season table.
#[derive(Debug, Clone)]
pub struct AggregateConfig {
    /// Batters below this many plate appearances are dropped (default 200).
    pub min_pa: u32,
    pub rules: LabelRules,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            min_pa: DEFAULT_MIN_PA,
            rules: LabelRules::default(),
        }
    }
}

/// Raw counts for one batter before rates and normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerTally {
    pub batter: u32,
    pub total_pa: u32,
    pub uab: u32,
    pub cab: u32,
}

/// A computed season, ready to persist.
#[derive(Debug, Clone)]
pub struct SeasonTable {
    pub season: i32,
    /// League cab / uab over every batter, before the min-PA filter.
    pub league_ratio: f64,
    pub plate_appearances: usize,
    /// Distinct batters before the min-PA filter.
    pub batters_seen: usize,
    /// Rows that passed the filter, sorted by CAB+ descending.
    pub players: Vec<PlayerAggregate>,
}

impl SeasonTable {
    pub fn rows(&self) -> Vec<SeasonRow> {
        self.players.iter().map(SeasonRow::from).collect()
    }
}

// ---------------------------------------------------------------------------
// Plate appearances
// ---------------------------------------------------------------------------

#[derive(Default)]
struct PaAccumulator {
    max_pitch: u32,
    // (pitch_number, outcome) of the latest pitch that recorded an outcome
    last_event: Option<(u32, String)>,
    speed_sum: f64,
    speed_n: u32,
    xwoba_sum: f64,
    xwoba_n: u32,
}

fn mean(sum: f64, n: u32) -> Option<f64> {
    (n > 0).then(|| sum / n as f64)
}

/// Collapse pitches into one record per (game, at-bat, batter).
///
/// Output is ordered by (game_pk, at_bat_number, batter) regardless of input order.
pub fn group_plate_appearances(pitches: &[PitchEvent]) -> Vec<PlateAppearance> {
    let mut groups: BTreeMap<PaKey, PaAccumulator> = BTreeMap::new();

    for p in pitches {
        let acc = groups.entry(p.pa_key()).or_default();
        acc.max_pitch = acc.max_pitch.max(p.pitch_number);

        if let Some(ref ev) = p.events {
            let newer = acc
                .last_event
                .as_ref()
                .map_or(true, |(n, _)| p.pitch_number >= *n);
            if newer {
                acc.last_event = Some((p.pitch_number, ev.clone()));
            }
        }
        if let Some(speed) = p.launch_speed {
            acc.speed_sum += speed;
            acc.speed_n += 1;
        }
        if let Some(xwoba) = p.estimated_woba {
            acc.xwoba_sum += xwoba;
            acc.xwoba_n += 1;
        }
    }

    groups
        .into_iter()
        .map(|(key, acc)| PlateAppearance {
            game_pk: key.game_pk,
            at_bat_number: key.at_bat_number,
            batter: key.batter,
            pitch_number: acc.max_pitch,
            events: acc.last_event.map(|(_, ev)| ev),
            launch_speed: mean(acc.speed_sum, acc.speed_n),
            estimated_woba: mean(acc.xwoba_sum, acc.xwoba_n),
        })
        .collect()
}

/// Label every plate appearance and sum per batter, ordered by batter id.
pub fn tally_players(pas: &[PlateAppearance], rules: &LabelRules) -> Vec<PlayerTally> {
    let mut by_batter: BTreeMap<u32, PlayerTally> = BTreeMap::new();

    for pa in pas {
        let label = rules.classify(pa);
        let t = by_batter.entry(pa.batter).or_insert(PlayerTally {
            batter: pa.batter,
            total_pa: 0,
            uab: 0,
            cab: 0,
        });
        t.total_pa += 1;
        t.uab += label.uab();
        t.cab += label.cab();
    }

    by_batter.into_values().collect()
}

/// Sum of cab over sum of uab. `None` unless the ratio is positive.
pub fn league_ratio(tallies: &[PlayerTally]) -> Option<f64> {
    let cab: u64 = tallies.iter().map(|t| t.cab as u64).sum();
    let uab: u64 = tallies.iter().map(|t| t.uab as u64).sum();
    (uab > 0 && cab > 0).then(|| cab as f64 / uab as f64)
}

/// Round half to even on the scaled value.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

fn percent(part: u32, total: u32) -> f64 {
    round_to(part as f64 / total as f64 * 100.0, 2)
}

/// Rates, raw ratio and CAB+ for one batter. Name is left blank.
pub fn score_player(t: &PlayerTally, league_ratio: f64) -> PlayerAggregate {
    let raw_ratio = (t.uab > 0).then(|| t.cab as f64 / t.uab as f64);
    let cab_plus = raw_ratio.map(|r| round_to(r / league_ratio * 100.0, 1));

    PlayerAggregate {
        batter: t.batter,
        player_name: String::new(),
        total_pa: t.total_pa,
        uab: t.uab,
        cab: t.cab,
        uab_rate: percent(t.uab, t.total_pa),
        cab_rate: percent(t.cab, t.total_pa),
        raw_ratio,
        cab_plus,
    }
}

/// CAB+ descending; undefined CAB+ after every defined value; ties by name, then batter id.
pub fn compare_rows(a: &PlayerAggregate, b: &PlayerAggregate) -> Ordering {
    let by_score = match (a.cab_plus, b.cab_plus) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_score
        .then_with(|| a.player_name.cmp(&b.player_name))
        .then_with(|| a.batter.cmp(&b.batter))
}

/// Score and filter a season without touching names.
///
/// Fails with [`CabError::NoUncompetitiveAtBats`] or [`CabError::NoCompetitiveAtBats`]
/// when the league ratio is not positive.
pub fn score_season(
    season: i32,
    pitches: &[PitchEvent],
    config: &AggregateConfig,
) -> std::result::Result<SeasonTable, CabError> {
    let pas = group_plate_appearances(pitches);
    let tallies = tally_players(&pas, &config.rules);

    let league = match league_ratio(&tallies) {
        Some(ratio) => ratio,
        None if tallies.iter().any(|t| t.uab > 0) => {
            return Err(CabError::NoCompetitiveAtBats { season })
        }
        None => return Err(CabError::NoUncompetitiveAtBats { season }),
    };

    debug!(
        season,
        pitches = pitches.len(),
        plate_appearances = pas.len(),
        batters = tallies.len(),
        league_ratio = league,
        "scored season"
    );

    let players = tallies
        .iter()
        .filter(|t| t.total_pa >= config.min_pa)
        .map(|t| score_player(t, league))
        .collect();

    Ok(SeasonTable {
        season,
        league_ratio: league,
        plate_appearances: pas.len(),
        batters_seen: tallies.len(),
        players,
    })
}

/// Build the full season table: score, filter, attach names, sort.
pub fn build_season_table(
    season: i32,
    pitches: &[PitchEvent],
    resolver: &dyn NameResolver,
    config: &AggregateConfig,
) -> Result<SeasonTable> {
    let mut table = score_season(season, pitches, config)?;

    let ids: Vec<u32> = table.players.iter().map(|p| p.batter).collect();
    let names = resolver
        .resolve(&ids)
        .with_context(|| format!("name lookup failed for season {}", season))?;

    let mut unresolved = 0usize;
    for p in &mut table.players {
        match names.get(&p.batter) {
            Some(name) => p.player_name = name.display_name(),
            None => unresolved += 1,
        }
    }
    table.players.sort_by(compare_rows);

    info!(
        season,
        players = table.players.len(),
        unresolved,
        league_ratio = table.league_ratio,
        "built season table"
    );
    Ok(table)
}
