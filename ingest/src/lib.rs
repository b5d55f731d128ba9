use std::path::Path;

use database::{Database, Store};
use tracing::{debug, info, instrument, warn};

pub mod calendar;
pub mod duration;
mod error;
pub mod id;
pub mod input;
pub mod resolve;
#[cfg(test)]
mod test_utils;

pub use duration::parse_duration;
pub use error::{Error, Result};
pub use id::{IdGenerator, UlidGenerator};
pub use input::{SongEntry, SourceEntry};
pub use resolve::{IngestReport, Resolver, SourceRequest, Tally};

use input::non_blank;

/// Source type used when an entry does not name one.
pub const DEFAULT_SOURCE_TYPE: &str = "live";

#[derive(Debug, Default, Clone)]
pub struct IngestOptions {
    /// Roll the transaction back instead of committing it.
    pub dry_run: bool,
}

/// Reads `path` and ingests it in a single transaction.
#[instrument(skip(database), level = "trace")]
pub async fn ingest_file(
    database: &Database,
    path: &Path,
    options: &IngestOptions,
) -> Result<IngestReport> {
    let entries = input::read_entries(path)?;
    let store = database.begin().await?;

    run(store, &mut UlidGenerator::default(), &entries, options).await
}

/// Ingests `entries` and then commits, or rolls back on error and on dry
/// runs. Either all of the entries end up in the store or none of them do.
pub async fn run<S: Store, G: IdGenerator>(
    mut store: S,
    ids: &mut G,
    entries: &[SourceEntry],
    options: &IngestOptions,
) -> Result<IngestReport> {
    let report = match ingest(&mut store, ids, entries).await {
        Ok(report) => report,
        Err(err) => {
            if let Err(rollback_err) = store.rollback().await {
                warn!(%rollback_err, "failed to roll back transaction");
            }
            return Err(err);
        }
    };

    if options.dry_run {
        store.rollback().await?;
        info!(%report, "dry run finished, changes rolled back");
    } else {
        store.commit().await?;
        info!(%report, "ingest committed");
    }

    Ok(report)
}

/// Resolves every entry against `store` without committing.
///
/// A source without a url fails the whole ingest, while a song without a
/// title, start or end is skipped.
pub async fn ingest<S: Store, G: IdGenerator>(
    store: &mut S,
    ids: &mut G,
    entries: &[SourceEntry],
) -> Result<IngestReport> {
    let mut resolver = Resolver::new(store, ids);

    for entry in entries {
        ingest_entry(&mut resolver, entry).await?;
    }

    Ok(resolver.into_report())
}

#[instrument(skip_all, fields(url = entry.url.as_deref()), level = "trace")]
async fn ingest_entry<S: Store, G: IdGenerator>(
    resolver: &mut Resolver<'_, S, G>,
    entry: &SourceEntry,
) -> Result<()> {
    let source_type = non_blank(entry.source_type.as_deref()).unwrap_or(DEFAULT_SOURCE_TYPE);
    let type_id = resolver.source_type(source_type).await?;

    let source_id = resolver
        .music_source(SourceRequest {
            url: entry.url.as_deref().unwrap_or_default(),
            title: entry.title.as_deref().unwrap_or_default().trim(),
            upload_date: entry.upload_date.as_deref().unwrap_or_default(),
            type_id,
            thumbnail_url: non_blank(entry.thumbnail_url.as_deref()),
        })
        .await?;

    for song in entry.songs.iter().flatten() {
        let (Some(title), Some(start_at), Some(end_at)) = (
            non_blank(song.title.as_deref()),
            non_blank(song.start_at.as_deref()),
            non_blank(song.end_at.as_deref()),
        ) else {
            debug!(?song, "skipping song with missing title or offsets");
            resolver.report_mut().skipped_songs += 1;
            continue;
        };

        let start_seconds = parse_duration(start_at)?;
        let mut end_seconds = parse_duration(end_at)?;
        if end_seconds <= start_seconds {
            debug!(title, start_seconds, end_seconds, "end not after start, clamping");
            end_seconds = start_seconds
                .checked_add(1)
                .ok_or_else(|| Error::InvalidTimeLiteral(start_at.to_string()))?;
        }

        let song_id = resolver
            .song(source_id, title, start_seconds, end_seconds)
            .await?;

        for name in song.singers.iter().flatten() {
            let Some(name) = non_blank(name.as_deref()) else {
                continue;
            };
            let singer_id = resolver.singer(name).await?;
            resolver.link(song_id, singer_id).await?;
        }
    }

    Ok(())
}
