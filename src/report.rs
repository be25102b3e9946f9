use std::path::Path;

use crate::aggregate::SeasonTable;
use crate::data::store::CachedSeason;
use crate::types::SeasonRow;

/// Summary of one precomputed season.
#[derive(Debug, Clone)]
pub struct SeasonReport {
    pub season: i32,
    pub plate_appearances: usize,
    pub batters_seen: usize,
    pub qualified: usize,
    pub min_pa: u32,
    pub league_ratio: f64,
    pub undefined: usize,
    /// (name, CAB+) of the first row, if any.
    pub leader: Option<(String, f64)>,
}

impl SeasonReport {
    pub fn from_table(table: &SeasonTable, min_pa: u32) -> Self {
        let leader = table
            .players
            .first()
            .and_then(|p| p.cab_plus.map(|v| (p.player_name.clone(), v)));

        Self {
            season: table.season,
            plate_appearances: table.plate_appearances,
            batters_seen: table.batters_seen,
            qualified: table.players.len(),
            min_pa,
            league_ratio: table.league_ratio,
            undefined: table.players.iter().filter(|p| p.cab_plus.is_none()).count(),
            leader,
        }
    }

    /// Print a formatted summary to stdout.
    pub fn print(&self, path: &Path) {
        println!();
        println!("{}", "=".repeat(55));
        println!("  CAB+ Season {}", self.season);
        println!("{}", "=".repeat(55));
        println!("  Plate appearances: {}", self.plate_appearances);
        println!("  Batters seen:      {}", self.batters_seen);
        println!("  Qualified (>= {} PA): {}", self.min_pa, self.qualified);
        println!("  League CAB/UAB:    {:.3}", self.league_ratio);
        if self.undefined > 0 {
            println!("  Undefined CAB+:    {}", self.undefined);
        }
        if let Some((ref name, score)) = self.leader {
            let name = if name.is_empty() { "(unknown)" } else { name.as_str() };
            println!("  Leader:            {} ({:.1})", name, score);
        }
        println!("  Saved to:          {}", path.display());
        println!();
    }
}

/// Render rows as a fixed-width text table.
pub fn format_rows(rows: &[&SeasonRow]) -> String {
    let width = rows
        .iter()
        .map(|r| r.player_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("player_name".len());

    let mut out = format!(
        "  {:<w$}  {:>8}  {:>5}  {:>5}  {:>8}  {:>8}  {:>6}\n",
        "player_name",
        "total_pa",
        "uab",
        "cab",
        "uab_rate",
        "cab_rate",
        "CAB+",
        w = width
    );
    for r in rows {
        let score = r
            .cab_plus
            .map(|v| format!("{:.1}", v))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "  {:<w$}  {:>8}  {:>5}  {:>5}  {:>8.2}  {:>8.2}  {:>6}\n",
            r.player_name,
            r.total_pa,
            r.uab,
            r.cab,
            r.uab_rate,
            r.cab_rate,
            score,
            w = width
        ));
    }
    out
}

/// Print a titled table to stdout.
pub fn print_rows(title: &str, rows: &[&SeasonRow]) {
    println!();
    println!("  --- {} {}", title, "-".repeat(50usize.saturating_sub(title.len())));
    print!("{}", format_rows(rows));
}

/// One line per cached season: year, pitch count, fetch time.
pub fn format_cached(seasons: &[CachedSeason]) -> String {
    let mut out = format!("  {:<6}  {:>9}  {}\n", "season", "pitches", "fetched_at");
    for s in seasons {
        out.push_str(&format!(
            "  {:<6}  {:>9}  {}\n",
            s.season, s.pitch_count, s.fetched_at
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlayerAggregate;

    fn make_player(batter: u32, name: &str, cab_plus: Option<f64>) -> PlayerAggregate {
        PlayerAggregate {
            batter,
            player_name: name.to_string(),
            total_pa: 300,
            uab: 60,
            cab: 240,
            uab_rate: 20.0,
            cab_rate: 80.0,
            raw_ratio: Some(4.0),
            cab_plus,
        }
    }

    fn make_table(players: Vec<PlayerAggregate>) -> SeasonTable {
        SeasonTable {
            season: 2023,
            league_ratio: 3.25,
            plate_appearances: 180_000,
            batters_seen: 650,
            players,
        }
    }

    #[test]
    fn test_report_from_table() {
        let table = make_table(vec![
            make_player(1, "Freddie Freeman", Some(131.4)),
            make_player(2, "", None),
        ]);
        let report = SeasonReport::from_table(&table, 200);
        assert_eq!(report.season, 2023);
        assert_eq!(report.qualified, 2);
        assert_eq!(report.undefined, 1);
        assert_eq!(report.leader, Some(("Freddie Freeman".to_string(), 131.4)));
    }

    #[test]
    fn test_report_empty_table() {
        let report = SeasonReport::from_table(&make_table(vec![]), 200);
        assert_eq!(report.qualified, 0);
        assert_eq!(report.leader, None);
        report.print(Path::new("data/pca2023.csv"));
    }

    #[test]
    fn test_format_rows() {
        let rows = vec![
            SeasonRow::from(&make_player(1, "Mookie Betts", Some(120.0))),
            SeasonRow::from(&make_player(2, "X", None)),
        ];
        let refs: Vec<&SeasonRow> = rows.iter().collect();
        let text = format_rows(&refs);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("CAB+"));
        assert!(lines[1].contains("Mookie Betts"));
        assert!(lines[1].trim_end().ends_with("120.0"));
        assert!(lines[2].trim_end().ends_with('-'));
        assert!(lines[1].contains("20.00"));
    }

    #[test]
    fn test_format_cached() {
        let seasons = vec![
            CachedSeason {
                season: 2022,
                fetched_at: "2024-01-05T10:00:00+00:00".to_string(),
                pitch_count: 712_345,
            },
            CachedSeason {
                season: 2023,
                fetched_at: "2024-02-01T08:30:00+00:00".to_string(),
                pitch_count: 0,
            },
        ];
        let text = format_cached(&seasons);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("fetched_at"));
        assert!(lines[1].starts_with("  2022"));
        assert!(lines[1].contains("712345"));
        assert!(lines[2].ends_with("2024-02-01T08:30:00+00:00"));
    }
}
