use std::fmt;

/// How a write treats an existing table at the same location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Replace the existing table in full.
    #[default]
    Overwrite,
    /// Fail if anything already exists at the location.
    ErrorIfExists,
}

/// What a single table write produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WriteSummary {
    pub location: String,
    pub rows: usize,
    pub partitions: usize,
    pub files: usize,
}

/// Where a family of raw source files lives under the source root.
///
/// This is the glob `<dir>/*/.../*.<extension>` with `depth` path segments
/// below `dir`, the last of which is the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLayout {
    pub dir: &'static str,
    pub depth: usize,
    pub extension: &'static str,
}

impl SourceLayout {
    /// Catalog files: `song_data/<A>/<B>/<C>/<track>.json`.
    pub const SONG_DATA: Self = Self {
        dir: "song_data",
        depth: 4,
        extension: "json",
    };

    /// Activity logs: `log_data/<year>/<month>/<day>-events.json`.
    pub const LOG_DATA: Self = Self {
        dir: "log_data",
        depth: 3,
        extension: "json",
    };

    /// Whether a `/`-separated path relative to the source root matches.
    pub fn matches(&self, relative: &str) -> bool {
        let segments: Vec<&str> = relative.split('/').collect();
        if segments.len() != self.depth + 1 || segments[0] != self.dir {
            return false;
        }
        if segments.iter().any(|segment| segment.is_empty()) {
            return false;
        }
        segments
            .last()
            .and_then(|name| name.rsplit_once('.'))
            .is_some_and(|(stem, extension)| !stem.is_empty() && extension == self.extension)
    }
}

impl fmt::Display for SourceLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir)?;
        for _ in 1..self.depth {
            write!(f, "/*")?;
        }
        write!(f, "/*.{}", self.extension)
    }
}

/// Every table the pipeline persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableId {
    StagingSongs,
    StagingEvents,
    Songs,
    Artists,
    Users,
    Time,
    SongPlays,
}

impl TableId {
    /// Location relative to the output root.
    pub fn location(&self) -> &'static str {
        match self {
            TableId::StagingSongs => "staging_songs/staging_songs.parquet",
            TableId::StagingEvents => "staging_events/staging_events.parquet",
            TableId::Songs => "songs/songs.parquet",
            TableId::Artists => "artists/artists.parquet",
            TableId::Users => "users/users.parquet",
            TableId::Time => "time/time.parquet",
            TableId::SongPlays => "songplays/songplays.parquet",
        }
    }

    /// Columns the table is partitioned by, in path order.
    pub fn partition_by(&self) -> &'static [&'static str] {
        match self {
            TableId::Songs => &["year", "artist_id"],
            TableId::Time | TableId::SongPlays => &["year", "month"],
            _ => &[],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TableId::StagingSongs => "staging_songs",
            TableId::StagingEvents => "staging_events",
            TableId::Songs => "songs",
            TableId::Artists => "artists",
            TableId::Users => "users",
            TableId::Time => "time",
            TableId::SongPlays => "songplays",
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
