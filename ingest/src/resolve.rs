use std::fmt;

use database::models::{Id, NewMusicSource, NewSinger, NewSong, SongKey};
use database::Store;
use tracing::{debug, instrument};

use crate::id::IdGenerator;
use crate::{calendar, Error, Result};

/// How many rows of one kind a run created and how many it found in place.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub created: usize,
    pub reused: usize,
}

impl Tally {
    fn record(&mut self, created: bool) {
        if created {
            self.created += 1;
        } else {
            self.reused += 1;
        }
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} new, {} existing", self.created, self.reused)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub source_types: Tally,
    pub sources: Tally,
    pub songs: Tally,
    pub singers: Tally,
    pub links: Tally,
    /// Song entries left out because title, start or end was blank.
    pub skipped_songs: usize,
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "source types: {}; sources: {}; songs: {}; singers: {}; links: {}; skipped songs: {}",
            self.source_types, self.sources, self.songs, self.singers, self.links, self.skipped_songs
        )
    }
}

/// Everything needed to create a music source that is not there yet.
#[derive(Debug, Clone, Copy)]
pub struct SourceRequest<'a> {
    pub url: &'a str,
    pub title: &'a str,
    /// Only parsed when the source has to be created.
    pub upload_date: &'a str,
    pub type_id: Id,
    pub thumbnail_url: Option<&'a str>,
}

pub struct Resolver<'a, S, G> {
    store: &'a mut S,
    ids: &'a mut G,
    report: IngestReport,
}

fn require<'v>(entity: &'static str, field: &'static str, value: &'v str) -> Result<&'v str> {
    match value.trim() {
        "" => Err(Error::MissingRequiredField { entity, field }),
        value => Ok(value),
    }
}

fn conflict(entity: &'static str, key: impl fmt::Debug) -> Error {
    Error::Persistence(database::Error::Conflict {
        entity,
        key: format!("{key:?}"),
    })
}

impl<'a, S: Store, G: IdGenerator> Resolver<'a, S, G> {
    pub fn new(store: &'a mut S, ids: &'a mut G) -> Self {
        Self {
            store,
            ids,
            report: IngestReport::default(),
        }
    }

    pub fn report_mut(&mut self) -> &mut IngestReport {
        &mut self.report
    }

    pub fn into_report(self) -> IngestReport {
        self.report
    }

    #[instrument(skip(self), ret, err, level = "trace")]
    pub async fn source_type(&mut self, name: &str) -> Result<Id> {
        let name = require("source type", "name", name)?;

        if let Some(id) = self.store.find_source_type(name).await? {
            self.report.source_types.record(false);
            return Ok(id);
        }

        let (id, created) = match self.store.insert_source_type(name).await? {
            Some(id) => (id, true),
            None => {
                let id = self.store.find_source_type(name).await?;
                (id.ok_or_else(|| conflict("source type", name))?, false)
            }
        };
        self.report.source_types.record(created);

        Ok(id)
    }

    #[instrument(skip(self), ret, err, level = "trace")]
    pub async fn singer(&mut self, name: &str) -> Result<Id> {
        let name = require("singer", "name", name)?;

        if let Some(id) = self.store.find_singer(name).await? {
            self.report.singers.record(false);
            return Ok(id);
        }

        let public_id = self.ids.new_id();
        let inserted = self
            .store
            .insert_singer(&NewSinger {
                public_id: &public_id,
                name,
            })
            .await?;
        let (id, created) = match inserted {
            Some(id) => (id, true),
            None => {
                let id = self.store.find_singer(name).await?;
                (id.ok_or_else(|| conflict("singer", name))?, false)
            }
        };
        self.report.singers.record(created);

        Ok(id)
    }

    /// Existing sources are returned untouched, title, date and thumbnail
    /// are only written on creation.
    #[instrument(skip(self), ret, err, level = "trace")]
    pub async fn music_source(&mut self, request: SourceRequest<'_>) -> Result<Id> {
        let url = require("music source", "url", request.url)?;

        if let Some(id) = self.store.find_music_source(url).await? {
            self.report.sources.record(false);
            return Ok(id);
        }

        let upload_date = calendar::parse(request.upload_date)
            .and_then(calendar::CalendarValue::date)
            .ok_or_else(|| Error::InvalidDate(request.upload_date.to_string()))?;
        let public_id = self.ids.new_id();
        let inserted = self
            .store
            .insert_music_source(&NewMusicSource {
                public_id: &public_id,
                title: request.title,
                url,
                upload_date,
                type_id: request.type_id,
                thumbnail_url: request.thumbnail_url,
            })
            .await?;
        let (id, created) = match inserted {
            Some(id) => (id, true),
            None => {
                let id = self.store.find_music_source(url).await?;
                (id.ok_or_else(|| conflict("music source", url))?, false)
            }
        };
        self.report.sources.record(created);

        Ok(id)
    }

    /// A song that already exists keeps its start offset; its end offset is
    /// overwritten with `end_seconds`.
    #[instrument(skip(self), ret, err, level = "trace")]
    pub async fn song(
        &mut self,
        source_id: Id,
        title: &str,
        start_seconds: i64,
        end_seconds: i64,
    ) -> Result<Id> {
        let key = SongKey {
            source_id,
            title: require("song", "title", title)?,
            start_seconds,
        };

        if let Some(id) = self.store.find_song(&key).await? {
            self.store.update_song_end(id, end_seconds).await?;
            self.report.songs.record(false);
            return Ok(id);
        }

        let public_id = self.ids.new_id();
        let inserted = self
            .store
            .insert_song(&NewSong {
                public_id: &public_id,
                key,
                end_seconds,
            })
            .await?;
        let (id, created) = match inserted {
            Some(id) => (id, true),
            None => {
                let id = self
                    .store
                    .find_song(&key)
                    .await?
                    .ok_or_else(|| conflict("song", key))?;
                self.store.update_song_end(id, end_seconds).await?;
                (id, false)
            }
        };
        self.report.songs.record(created);

        Ok(id)
    }

    #[instrument(skip(self), err, level = "trace")]
    pub async fn link(&mut self, song_id: Id, singer_id: Id) -> Result<()> {
        let created = self.store.insert_song_singer(song_id, singer_id).await?;
        if !created {
            debug!(song_id, singer_id, "singer already linked");
        }
        self.report.links.record(created);

        Ok(())
    }
}
