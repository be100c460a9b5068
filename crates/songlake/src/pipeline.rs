//! Sequences ingestion, the dimension and fact builders, and table writes.

use std::sync::Arc;

use songlake_core::{
    records::{ActivityRecord, CatalogRecord, CATALOG_SCHEMA},
    storage::{RecordSource, SourceLayout, TableId, TableReader, TableWriter, WriteMode, WriteSummary},
    table::{Table, TableRow},
    transform::{
        build_artists_table, build_songs_table, build_time_table, build_users_table,
        resolve_songplays, to_playback_events, ExactMatch, ResolveStats, SongMatcher,
    },
};

use crate::{error::PipelineError, ingest::ingest, storage::Backends};

/// What a run wrote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// One entry per table, in write order.
    pub tables: Vec<(TableId, WriteSummary)>,
    /// Present when the song-play table was built.
    pub songplays: Option<ResolveStats>,
}

impl RunReport {
    pub fn summary(&self, table: TableId) -> Option<&WriteSummary> {
        self.tables
            .iter()
            .find(|(id, _)| *id == table)
            .map(|(_, summary)| summary)
    }

    fn merge(&mut self, other: RunReport) {
        self.tables.extend(other.tables);
        if other.songplays.is_some() {
            self.songplays = other.songplays;
        }
    }
}

/// Builds the star schema from the catalog feed and the activity log.
///
/// Every table is written with [`WriteMode::Overwrite`], so re-running over
/// the same input reproduces the same output. The first failure aborts the
/// run.
pub struct Pipeline<M: SongMatcher = ExactMatch> {
    source: Arc<dyn RecordSource>,
    writer: Arc<dyn TableWriter>,
    reader: Arc<dyn TableReader>,
    matcher: M,
}

impl Pipeline {
    pub fn new(backends: Backends) -> Self {
        Self {
            source: backends.source,
            writer: backends.writer,
            reader: backends.reader,
            matcher: ExactMatch,
        }
    }
}

impl<M: SongMatcher> Pipeline<M> {
    /// Replaces the strategy used to match playback events to catalog songs.
    #[cfg(test)]
    pub fn with_matcher<N: SongMatcher>(self, matcher: N) -> Pipeline<N> {
        Pipeline {
            source: self.source,
            writer: self.writer,
            reader: self.reader,
            matcher,
        }
    }

    /// Processes the catalog, then the activity log.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let mut report = self.process_song_data().await?;
        report.merge(self.process_log_data().await?);
        Ok(report)
    }

    /// Catalog → `staging_songs`, `songs`, `artists`.
    pub async fn process_song_data(&self) -> Result<RunReport, PipelineError> {
        let layout = SourceLayout::SONG_DATA;
        let catalog: Vec<CatalogRecord> = ingest(self.source.as_ref(), &layout)
            .await
            .map_err(|source| PipelineError::Ingest { layout, source })?;

        let mut report = RunReport::default();
        self.write(&mut report, TableId::StagingSongs, &catalog).await?;
        self.write(&mut report, TableId::Songs, &build_songs_table(&catalog))
            .await?;
        self.write(&mut report, TableId::Artists, &build_artists_table(&catalog))
            .await?;

        tracing::info!(catalog_records = catalog.len(), "Processed song data");
        Ok(report)
    }

    /// Activity log → `staging_events`, `users`, `time`, `songplays`.
    ///
    /// Reads the catalog back from `staging_songs`, so the catalog must have
    /// been processed first.
    pub async fn process_log_data(&self) -> Result<RunReport, PipelineError> {
        let layout = SourceLayout::LOG_DATA;
        let activity: Vec<ActivityRecord> = ingest(self.source.as_ref(), &layout)
            .await
            .map_err(|source| PipelineError::Ingest { layout, source })?;

        let mut report = RunReport::default();
        self.write(&mut report, TableId::StagingEvents, &activity)
            .await?;

        let activity_records = activity.len();
        let events = to_playback_events(activity)?;
        tracing::info!(
            activity_records,
            playback_events = events.len(),
            "Filtered playback events"
        );

        let users = build_users_table(events.iter().map(|event| &event.record));
        self.write(&mut report, TableId::Users, &users).await?;

        let time = build_time_table(events.iter().map(|event| event.start_time));
        self.write(&mut report, TableId::Time, &time).await?;

        let catalog = self.read_catalog().await?;
        let resolution = resolve_songplays(&events, &catalog, &self.matcher);
        let stats = resolution.stats;
        tracing::info!(
            events = stats.events,
            matched = stats.matched,
            unmatched = stats.unmatched,
            "Resolved song plays"
        );
        if stats.fanned_out > 0 {
            tracing::warn!(
                extra_rows = stats.fanned_out,
                "Some playback events matched more than one catalog song"
            );
        }

        self.write(&mut report, TableId::SongPlays, &resolution.rows)
            .await?;
        report.songplays = Some(stats);
        Ok(report)
    }

    async fn read_catalog(&self) -> Result<Vec<CatalogRecord>, PipelineError> {
        let table = TableId::StagingSongs;
        self.reader
            .read(table.location(), CATALOG_SCHEMA)
            .await
            .map_err(|source| PipelineError::Read { table, source })?
            .into_rows()
            .map_err(|source| PipelineError::Decode { table, source })
    }

    async fn write<R: TableRow>(
        &self,
        report: &mut RunReport,
        table: TableId,
        rows: &[R],
    ) -> Result<(), PipelineError> {
        let data = Table::from_rows(rows);
        let summary = self
            .writer
            .write(
                &data,
                table.location(),
                table.partition_by(),
                WriteMode::Overwrite,
            )
            .await
            .map_err(|source| PipelineError::Write { table, source })?;

        tracing::info!(
            table = %table,
            location = %summary.location,
            rows = summary.rows,
            partitions = summary.partitions,
            files = summary.files,
            "Wrote table"
        );

        report.tables.push((table, summary));
        Ok(())
    }
}
