/// DDL for the pitch-event cache.

pub const CREATE_PITCHES: &str = "
CREATE TABLE IF NOT EXISTS cab_pitches (
    season          INTEGER NOT NULL,
    game_pk         INTEGER NOT NULL,
    at_bat_number   INTEGER NOT NULL,
    batter          INTEGER NOT NULL,
    pitch_number    INTEGER NOT NULL,
    events          TEXT,
    launch_speed    REAL,
    estimated_woba  REAL
);
";

pub const CREATE_SEASONS: &str = "
CREATE TABLE IF NOT EXISTS cab_seasons (
    season       INTEGER PRIMARY KEY,
    fetched_at   TEXT NOT NULL,
    pitch_count  INTEGER NOT NULL
);
";

pub const CREATE_INDEXES: &str = "
CREATE INDEX IF NOT EXISTS idx_cab_pitches_season ON cab_pitches(season);
CREATE INDEX IF NOT EXISTS idx_cab_pitches_pa ON cab_pitches(season, game_pk, at_bat_number, batter);
";

pub const INSERT_PITCH: &str = "
INSERT INTO cab_pitches
    (season, game_pk, at_bat_number, batter, pitch_number, events, launch_speed, estimated_woba)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
";

pub const LOAD_PITCHES: &str = "
SELECT game_pk, at_bat_number, batter, pitch_number, events, launch_speed, estimated_woba
FROM cab_pitches
WHERE season = ?1
ORDER BY game_pk, at_bat_number, batter, pitch_number
";

pub const LIST_SEASONS: &str = "
SELECT season, fetched_at, pitch_count
FROM cab_seasons
ORDER BY season
";
