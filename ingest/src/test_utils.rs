use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use database::models::{Id, NewMusicSource, NewSinger, NewSong, SongKey};
use database::{Result, Store};
use time::Date;

use crate::id::IdGenerator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingerRow {
    pub id: Id,
    pub public_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub id: Id,
    pub public_id: String,
    pub title: String,
    pub url: String,
    pub upload_date: Date,
    pub type_id: Id,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRow {
    pub id: Id,
    pub public_id: String,
    pub source_id: Id,
    pub title: String,
    pub start_seconds: i64,
    pub end_seconds: i64,
    /// Times the end offset was rewritten after creation.
    pub updates: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tables {
    pub source_types: Vec<(Id, String)>,
    pub singers: Vec<SingerRow>,
    pub sources: Vec<SourceRow>,
    pub songs: Vec<SongRow>,
    pub song_singers: BTreeSet<(Id, Id)>,
    last_id: Id,
}

impl Tables {
    fn next_id(&mut self) -> Id {
        self.last_id += 1;
        self.last_id
    }

    pub fn counts(&self) -> [usize; 5] {
        [
            self.source_types.len(),
            self.sources.len(),
            self.songs.len(),
            self.singers.len(),
            self.song_singers.len(),
        ]
    }
}

/// Committed state shared by the stores it hands out.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    committed: Arc<Mutex<Tables>>,
}

impl MemoryDatabase {
    pub fn begin(&self) -> MemoryStore {
        MemoryStore {
            working: self.snapshot(),
            committed: self.committed.clone(),
            rival_writer: false,
        }
    }

    pub fn snapshot(&self) -> Tables {
        self.committed.lock().unwrap().clone()
    }
}

/// One open transaction on a [`MemoryDatabase`].
#[derive(Debug)]
pub struct MemoryStore {
    working: Tables,
    committed: Arc<Mutex<Tables>>,
    rival_writer: bool,
}

impl MemoryStore {
    /// Every insert finds its row already created by someone else, as if a
    /// concurrent run won each race between lookup and insert.
    pub fn with_rival_writer(mut self) -> Self {
        self.rival_writer = true;
        self
    }

    pub fn tables(&self) -> &Tables {
        &self.working
    }

    /// Inserts `row` unless `exists`; reports `None` for a conflict the way
    /// `on conflict do nothing` does.
    fn insert(&mut self, exists: bool, row: impl FnOnce(&mut Tables, Id)) -> Option<Id> {
        if exists {
            return None;
        }
        let id = self.working.next_id();
        row(&mut self.working, id);
        (!self.rival_writer).then_some(id)
    }

    fn song_position(&self, key: &SongKey<'_>) -> Option<usize> {
        self.working.songs.iter().position(|song| {
            song.source_id == key.source_id
                && song.title == key.title
                && song.start_seconds == key.start_seconds
        })
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_source_type(&mut self, name: &str) -> Result<Option<Id>> {
        Ok(self
            .working
            .source_types
            .iter()
            .find(|(_, existing)| existing == name)
            .map(|(id, _)| *id))
    }

    async fn insert_source_type(&mut self, name: &str) -> Result<Option<Id>> {
        let exists = self.find_source_type(name).await?.is_some();
        Ok(self.insert(exists, |tables, id| {
            tables.source_types.push((id, name.to_string()))
        }))
    }

    async fn find_singer(&mut self, name: &str) -> Result<Option<Id>> {
        Ok(self
            .working
            .singers
            .iter()
            .find(|singer| singer.name == name)
            .map(|singer| singer.id))
    }

    async fn insert_singer(&mut self, singer: &NewSinger<'_>) -> Result<Option<Id>> {
        let exists = self.find_singer(singer.name).await?.is_some();
        Ok(self.insert(exists, |tables, id| {
            tables.singers.push(SingerRow {
                id,
                public_id: singer.public_id.to_string(),
                name: singer.name.to_string(),
            })
        }))
    }

    async fn find_music_source(&mut self, url: &str) -> Result<Option<Id>> {
        Ok(self
            .working
            .sources
            .iter()
            .find(|source| source.url == url)
            .map(|source| source.id))
    }

    async fn insert_music_source(&mut self, source: &NewMusicSource<'_>) -> Result<Option<Id>> {
        let exists = self.find_music_source(source.url).await?.is_some();
        Ok(self.insert(exists, |tables, id| {
            tables.sources.push(SourceRow {
                id,
                public_id: source.public_id.to_string(),
                title: source.title.to_string(),
                url: source.url.to_string(),
                upload_date: source.upload_date,
                type_id: source.type_id,
                thumbnail_url: source.thumbnail_url.map(str::to_string),
            })
        }))
    }

    async fn find_song(&mut self, key: &SongKey<'_>) -> Result<Option<Id>> {
        Ok(self
            .song_position(key)
            .map(|position| self.working.songs[position].id))
    }

    async fn insert_song(&mut self, song: &NewSong<'_>) -> Result<Option<Id>> {
        // mirrors the check constraint on the songs table
        assert!(
            song.end_seconds > song.key.start_seconds,
            "end_at must be greater than start_at: {song:?}"
        );
        let exists = self.song_position(&song.key).is_some();
        Ok(self.insert(exists, |tables, id| {
            tables.songs.push(SongRow {
                id,
                public_id: song.public_id.to_string(),
                source_id: song.key.source_id,
                title: song.key.title.to_string(),
                start_seconds: song.key.start_seconds,
                end_seconds: song.end_seconds,
                updates: 0,
            })
        }))
    }

    async fn update_song_end(&mut self, song_id: Id, end_seconds: i64) -> Result<()> {
        if let Some(song) = self.working.songs.iter_mut().find(|song| song.id == song_id) {
            song.end_seconds = end_seconds;
            song.updates += 1;
        }
        Ok(())
    }

    async fn insert_song_singer(&mut self, song_id: Id, singer_id: Id) -> Result<bool> {
        Ok(self.working.song_singers.insert((song_id, singer_id)))
    }

    async fn commit(self) -> Result<()> {
        *self.committed.lock().unwrap() = self.working;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        Ok(())
    }
}

/// Hands out `id-0001`, `id-0002`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    issued: usize,
}

impl IdGenerator for SequentialIds {
    fn new_id(&mut self) -> String {
        self.issued += 1;
        format!("id-{:04}", self.issued)
    }
}
