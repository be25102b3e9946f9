//! Persisted season tables: one `pca{YYYY}.csv` per season in a data directory.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::error::CabError;
use crate::types::SeasonRow;

const FILE_PREFIX: &str = "pca";
const FILE_EXT: &str = ".csv";

/// Parse the season out of a file name like `pca2022.csv`.
pub fn parse_season_file_name(name: &str) -> Option<i32> {
    let year = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_EXT)?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    year.parse().ok()
}

/// Write rows with the season-table header to any writer.
pub fn write_rows<W: Write>(writer: W, rows: &[SeasonRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        // serialize() emits the header with the first row; write it explicitly here.
        wtr.write_record(["player_name", "total_pa", "uab", "cab", "uab_rate", "cab_rate", "CAB+"])?;
    }
    for r in rows {
        wtr.serialize(r)
            .with_context(|| format!("failed to write CSV row for '{}'", r.player_name))?;
    }
    wtr.flush().context("failed to flush CSV")?;
    Ok(())
}

/// Write rows to `path` in one shot.
pub fn export_rows(rows: &[SeasonRow], path: &Path) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("failed to create CSV at {}", path.display()))?;
    write_rows(file, rows)
}

/// Read rows written by [`write_rows`].
pub fn read_rows(path: &Path) -> Result<Vec<SeasonRow>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    rdr.deserialize()
        .collect::<std::result::Result<Vec<SeasonRow>, _>>()
        .with_context(|| format!("failed to parse season table {}", path.display()))
}

/// The directory of precomputed season tables.
#[derive(Debug, Clone)]
pub struct SeasonFiles {
    dir: PathBuf,
}

impl SeasonFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, season: i32) -> PathBuf {
        self.dir.join(format!("{}{}{}", FILE_PREFIX, season, FILE_EXT))
    }

    /// Replace the season's table. Writes a temp file and renames it over the target.
    pub fn write(&self, season: i32, rows: &[SeasonRow]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        let target = self.path_for(season);
        let tmp = target.with_extension("csv.tmp");
        if let Err(e) = export_rows(rows, &tmp) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        fs::rename(&tmp, &target).with_context(|| {
            format!("failed to move {} to {}", tmp.display(), target.display())
        })?;

        debug!(season, rows = rows.len(), path = %target.display(), "wrote season table");
        Ok(target)
    }

    /// Seasons with a table on disk, ascending. A missing directory has none.
    pub fn list_seasons(&self) -> Result<Vec<i32>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut seasons = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("failed to read dir {}", self.dir.display()))?
        {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(season) = entry.file_name().to_str().and_then(parse_season_file_name) {
                seasons.push(season);
            }
        }
        seasons.sort_unstable();
        Ok(seasons)
    }

    /// Like [`list_seasons`](Self::list_seasons) but an empty result is an error.
    pub fn require_seasons(&self) -> Result<Vec<i32>> {
        let seasons = self.list_seasons()?;
        if seasons.is_empty() {
            return Err(CabError::NoSeasonTables {
                dir: self.dir.clone(),
            }
            .into());
        }
        Ok(seasons)
    }

    pub fn read(&self, season: i32) -> Result<Vec<SeasonRow>> {
        let path = self.path_for(season);
        if !path.is_file() {
            return Err(CabError::SeasonNotFound {
                season,
                dir: self.dir.clone(),
            }
            .into());
        }
        read_rows(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_row(name: &str, total_pa: u32, uab: u32, cab_plus: Option<f64>) -> SeasonRow {
        let cab = total_pa - uab;
        SeasonRow {
            player_name: name.to_string(),
            total_pa,
            uab,
            cab,
            uab_rate: crate::aggregate::round_to(uab as f64 / total_pa as f64 * 100.0, 2),
            cab_rate: crate::aggregate::round_to(cab as f64 / total_pa as f64 * 100.0, 2),
            cab_plus,
        }
    }

    #[test]
    fn test_parse_season_file_name() {
        assert_eq!(parse_season_file_name("pca2022.csv"), Some(2022));
        assert_eq!(parse_season_file_name("pca22.csv"), None);
        assert_eq!(parse_season_file_name("pca2022.csv.tmp"), None);
        assert_eq!(parse_season_file_name("CAB2022_min200.csv"), None);
        assert_eq!(parse_season_file_name("pcaabcd.csv"), None);
    }

    #[test]
    fn test_write_layout() {
        let mut buf = Vec::new();
        let rows = vec![
            make_row("Aaron Judge", 3, 2, Some(100.0)),
            make_row("", 600, 0, None),
        ];
        write_rows(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "player_name,total_pa,uab,cab,uab_rate,cab_rate,CAB+");
        assert_eq!(lines[1], "Aaron Judge,3,2,1,66.67,33.33,100.0");
        assert_eq!(lines[2], ",600,0,600,0.0,100.0,");
    }

    #[test]
    fn test_empty_table_still_has_header() {
        let mut buf = Vec::new();
        write_rows(&mut buf, &[]).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "player_name,total_pa,uab,cab,uab_rate,cab_rate,CAB+\n"
        );
    }

    #[test]
    fn test_write_read_and_list() {
        let tmp = TempDir::new().unwrap();
        let files = SeasonFiles::new(tmp.path().join("data"));
        assert!(files.list_seasons().unwrap().is_empty());

        let rows = vec![make_row("Juan Soto", 700, 100, Some(120.5)), make_row("Ohtani", 650, 650, Some(0.0))];
        let path = files.write(2023, &rows).unwrap();
        assert_eq!(path, tmp.path().join("data").join("pca2023.csv"));
        files.write(2021, &rows[..1]).unwrap();
        std::fs::write(tmp.path().join("data").join("notes.txt"), "x").unwrap();

        assert_eq!(files.list_seasons().unwrap(), vec![2021, 2023]);
        assert_eq!(files.read(2023).unwrap(), rows);
        assert!(!tmp.path().join("data").join("pca2023.csv.tmp").exists());
    }

    #[test]
    fn test_write_replaces_wholesale() {
        let tmp = TempDir::new().unwrap();
        let files = SeasonFiles::new(tmp.path());
        files
            .write(2022, &[make_row("A", 300, 30, Some(90.0)), make_row("B", 300, 60, Some(80.0))])
            .unwrap();
        files.write(2022, &[make_row("C", 250, 25, Some(101.0))]).unwrap();

        let rows = files.read(2022).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].player_name, "C");
    }

    #[test]
    fn test_missing_tables_are_errors() {
        let tmp = TempDir::new().unwrap();
        let files = SeasonFiles::new(tmp.path());

        let err = files.require_seasons().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CabError>(),
            Some(CabError::NoSeasonTables { .. })
        ));

        let err = files.read(1999).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CabError>(),
            Some(CabError::SeasonNotFound { season: 1999, .. })
        ));
    }
}
