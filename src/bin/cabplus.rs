use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use cabplus::aggregate::{AggregateConfig, DEFAULT_MIN_PA};
use cabplus::data::statcast::read_pitch_file;
use cabplus::data::{
    CachedSource, ChadwickRegister, NameResolver, PitchSource, SeasonFiles, SqliteStore,
    StatcastClient, StatsApiClient,
};
use cabplus::leaderboard::{Leaderboard, DEFAULT_LEADERBOARD_SIZE, MIN_PA_RANGE};
use cabplus::precompute::{parse_season_arg, parse_seasons, Precompute, SeasonStatus};
use cabplus::report::{format_cached, print_rows};

#[derive(Parser)]
#[command(name = "cabplus", about = "CAB+ -- Competitive At-Bat Ratio Plus leaderboards")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum NameSource {
    /// Chadwick Bureau register (local file with --register, else downloaded)
    Chadwick,
    /// MLB Stats API
    Statsapi,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch Statcast data and write one CAB+ table per season
    Precompute {
        /// Seasons to compute (e.g. 2022 2023)
        #[arg(required = true)]
        seasons: Vec<String>,

        /// Minimum plate appearances to be listed
        #[arg(long, default_value_t = DEFAULT_MIN_PA)]
        min_pa: u32,

        /// Directory for pca{YYYY}.csv tables
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// SQLite pitch cache; seasons already cached are not re-downloaded
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Re-download seasons even if cached
        #[arg(long)]
        refresh: bool,

        /// Where batter names come from
        #[arg(long, value_enum, default_value = "chadwick")]
        names: NameSource,

        /// Chadwick register CSV file or directory of people-*.csv
        #[arg(long)]
        register: Option<PathBuf>,
    },

    /// Load a local Statcast CSV into the pitch cache
    Import {
        /// Season the file belongs to
        #[arg(long)]
        season: String,

        /// Statcast CSV export
        #[arg(long)]
        csv: PathBuf,

        /// Destination cache database
        #[arg(long)]
        cache: PathBuf,
    },

    /// List seasons with precomputed tables
    Seasons {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Also list seasons held in this pitch cache
        #[arg(long)]
        cache: Option<PathBuf>,
    },

    /// Show leaderboards for a precomputed season
    Show {
        /// Season (default: earliest available)
        #[arg(long)]
        season: Option<i32>,

        /// Minimum plate appearances
        #[arg(long, default_value_t = DEFAULT_MIN_PA)]
        min_pa: u32,

        /// Rows per leaderboard
        #[arg(long, default_value_t = DEFAULT_LEADERBOARD_SIZE)]
        top: usize,

        /// Case-insensitive player name search
        #[arg(long)]
        search: Option<String>,

        /// Export the filtered table to a file or directory
        #[arg(long)]
        export: Option<PathBuf>,

        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Precompute {
            seasons,
            min_pa,
            data_dir,
            cache,
            refresh,
            names,
            register,
        } => cmd_precompute(seasons, min_pa, data_dir, cache, refresh, names, register),
        Commands::Import { season, csv, cache } => cmd_import(season, csv, cache),
        Commands::Seasons { data_dir, cache } => cmd_seasons(data_dir, cache),
        Commands::Show {
            season,
            min_pa,
            top,
            search,
            export,
            data_dir,
        } => cmd_show(season, min_pa, top, search, export, data_dir),
    }
}

fn build_resolver(
    names: NameSource,
    register: Option<PathBuf>,
) -> Result<Box<dyn NameResolver>> {
    let resolver: Box<dyn NameResolver> = match (names, register) {
        (NameSource::Chadwick, Some(path)) => Box::new(
            ChadwickRegister::from_path(&path)
                .with_context(|| format!("failed to load register at {}", path.display()))?,
        ),
        (NameSource::Chadwick, None) => {
            println!("Downloading Chadwick register...");
            Box::new(ChadwickRegister::fetch().context("failed to download register")?)
        }
        (NameSource::Statsapi, _) => Box::new(StatsApiClient::default()),
    };
    Ok(resolver)
}

fn cmd_precompute(
    args: Vec<String>,
    min_pa: u32,
    data_dir: PathBuf,
    cache: Option<PathBuf>,
    refresh: bool,
    names: NameSource,
    register: Option<PathBuf>,
) -> Result<()> {
    let seasons = parse_seasons(&args);
    if seasons.is_empty() {
        bail!("no valid seasons given (expected years like 2022)");
    }

    let resolver = build_resolver(names, register)?;
    let source: Box<dyn PitchSource> = match cache {
        Some(ref path) => {
            let store = SqliteStore::open(path)
                .with_context(|| format!("failed to open cache at {}", path.display()))?;
            store.init().context("failed to initialize cache schema")?;
            Box::new(CachedSource::new(StatcastClient::default(), store).with_refresh(refresh))
        }
        None => Box::new(StatcastClient::default()),
    };

    let config = AggregateConfig {
        min_pa,
        ..Default::default()
    };
    let files = SeasonFiles::new(data_dir);
    let precompute = Precompute::new(source.as_ref(), resolver.as_ref(), files, config);

    let outcomes = precompute.run(&seasons);

    let mut failed = 0usize;
    for outcome in &outcomes {
        match &outcome.status {
            SeasonStatus::Saved { path, report } => {
                report.print(path);
                println!("  [ok] {} -> {}", outcome.season, path.display());
            }
            SeasonStatus::Failed { reason } => {
                failed += 1;
                println!();
                println!("  [FAILED] {}: {}", outcome.season, reason);
            }
        }
    }

    println!();
    println!(
        "Done: {} succeeded, {} failed",
        outcomes.len() - failed,
        failed
    );
    if failed > 0 {
        bail!("{} of {} seasons failed", failed, outcomes.len());
    }
    Ok(())
}

fn cmd_import(season: String, csv: PathBuf, cache: PathBuf) -> Result<()> {
    let season = parse_season_arg(&season)?;

    println!("Importing Statcast CSV");
    println!("  Source: {}", csv.display());
    println!("  Cache:  {}", cache.display());
    println!("  Season: {}", season);

    let parsed = read_pitch_file(&csv)?;

    let store = SqliteStore::open(&cache)
        .with_context(|| format!("failed to open cache at {}", cache.display()))?;
    store.init().context("failed to initialize cache schema")?;
    store
        .replace_season(season, &parsed.pitches)
        .context("import failed")?;

    println!();
    println!("Import complete:");
    println!("  Pitches imported: {}", parsed.pitches.len());
    println!("  Rows skipped:     {}", parsed.skipped);
    println!();
    Ok(())
}

fn cmd_seasons(data_dir: PathBuf, cache: Option<PathBuf>) -> Result<()> {
    if let Some(path) = cache {
        let store = SqliteStore::open(&path)
            .with_context(|| format!("failed to open cache at {}", path.display()))?;
        store.init().context("failed to initialize cache schema")?;
        let cached = store.list_seasons()?;
        println!("Cached seasons in {}:", path.display());
        if cached.is_empty() {
            println!("  (none)");
        } else {
            print!("{}", format_cached(&cached));
        }
        println!();
    }

    let files = SeasonFiles::new(data_dir);
    let seasons = files.require_seasons()?;
    println!("CAB+ tables in {}:", files.dir().display());
    for season in seasons {
        println!("  {}  {}", season, files.path_for(season).display());
    }
    Ok(())
}

fn cmd_show(
    season: Option<i32>,
    min_pa: u32,
    top: usize,
    search: Option<String>,
    export: Option<PathBuf>,
    data_dir: PathBuf,
) -> Result<()> {
    if !MIN_PA_RANGE.contains(&min_pa) {
        bail!(
            "--min-pa must be between {} and {}",
            MIN_PA_RANGE.start(),
            MIN_PA_RANGE.end()
        );
    }

    let files = SeasonFiles::new(data_dir);
    let available = files.require_seasons()?;
    let season = match season {
        Some(s) => s,
        None => available[0],
    };

    let board = Leaderboard::load(&files, season, min_pa)?;
    println!();
    println!(
        "CAB+ {} -- {} batters with >= {} PA",
        season,
        board.rows().len(),
        min_pa
    );

    if board.is_empty() {
        println!("  No batters meet the minimum plate appearances.");
    } else {
        let best: Vec<_> = board.top(top).iter().collect();
        print_rows(&format!("Top {} CAB+ Batters - {}", top, season), &best);
        let worst: Vec<_> = board.bottom(top).iter().collect();
        print_rows(&format!("Bottom {} CAB+ Batters - {}", top, season), &worst);
    }

    if let Some(query) = search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let hits = board.search(query);
        println!();
        if hits.is_empty() {
            println!("  No matching player in current dataset.");
        } else {
            println!("  Found {} matching player(s).", hits.len());
            print_rows(&format!("Search: {}", query), &hits);
        }
    }

    if let Some(target) = export {
        let path = board.export(&target)?;
        println!();
        println!("  Exported {} rows to {}", board.rows().len(), path.display());
    }
    println!();
    Ok(())
}
