//! Batch precompute: fetch, score and persist one table per requested season.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::aggregate::{build_season_table, AggregateConfig, SeasonTable};
use crate::data::{NameResolver, PitchSource, SeasonFiles};
use crate::error::CabError;
use crate::report::SeasonReport;

/// Parse a season argument. Must be a 4-digit year.
pub fn parse_season_arg(arg: &str) -> std::result::Result<i32, CabError> {
    let trimmed = arg.trim();
    match trimmed.parse::<i32>() {
        Ok(season) if (1000..=9999).contains(&season) => Ok(season),
        _ => Err(CabError::InvalidSeason {
            arg: arg.to_string(),
        }),
    }
}

/// Valid seasons from `args` in order, duplicates dropped. Invalid ones are logged and skipped.
pub fn parse_seasons<S: AsRef<str>>(args: &[S]) -> Vec<i32> {
    let mut seasons = Vec::new();
    for arg in args {
        match parse_season_arg(arg.as_ref()) {
            Ok(season) if !seasons.contains(&season) => seasons.push(season),
            Ok(_) => {}
            Err(e) => warn!("skipping {}", e),
        }
    }
    seasons
}

/// What happened to one season in a batch.
#[derive(Debug)]
pub enum SeasonStatus {
    Saved { path: PathBuf, report: SeasonReport },
    Failed { reason: String },
}

#[derive(Debug)]
pub struct SeasonOutcome {
    pub season: i32,
    pub status: SeasonStatus,
}

impl SeasonOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, SeasonStatus::Saved { .. })
    }
}

/// Wires a pitch source, a name resolver and the output directory together.
pub struct Precompute<'a> {
    source: &'a dyn PitchSource,
    resolver: &'a dyn NameResolver,
    files: SeasonFiles,
    config: AggregateConfig,
}

impl<'a> Precompute<'a> {
    pub fn new(
        source: &'a dyn PitchSource,
        resolver: &'a dyn NameResolver,
        files: SeasonFiles,
        config: AggregateConfig,
    ) -> Self {
        Self {
            source,
            resolver,
            files,
            config,
        }
    }

    pub fn files(&self) -> &SeasonFiles {
        &self.files
    }

    /// Compute and persist one season. On error nothing is written.
    pub fn run_season(&self, season: i32) -> Result<(SeasonTable, PathBuf)> {
        let pitches = self
            .source
            .fetch_season(season)
            .with_context(|| format!("failed to fetch pitches for {}", season))?;

        let table = build_season_table(season, &pitches, self.resolver, &self.config)?;
        let path = self
            .files
            .write(season, &table.rows())
            .with_context(|| format!("failed to save table for {}", season))?;
        Ok((table, path))
    }

    /// Run every season; a failed season is recorded and the batch moves on.
    pub fn run(&self, seasons: &[i32]) -> Vec<SeasonOutcome> {
        let mut outcomes = Vec::with_capacity(seasons.len());
        for &season in seasons {
            info!("processing {}...", season);
            let status = match self.run_season(season) {
                Ok((table, path)) => {
                    info!(season, path = %path.display(), "saved CAB+ table");
                    SeasonStatus::Saved {
                        path,
                        report: SeasonReport::from_table(&table, self.config.min_pa),
                    }
                }
                Err(e) => {
                    error!(season, "season failed: {:#}", e);
                    SeasonStatus::Failed {
                        reason: format!("{:#}", e),
                    }
                }
            };
            outcomes.push(SeasonOutcome { season, status });
        }
        outcomes
    }
}
