use async_trait::async_trait;

use crate::models::{Id, NewMusicSource, NewSinger, NewSong, SongKey};
use crate::Result;

/// Transactional access to the music tables.
///
/// `find_*` look a row up by its natural key. `insert_*` return `None` when a
/// row with the same natural key already exists, which only happens if
/// another writer created it after the lookup; callers are expected to look
/// the row up again in that case.
///
/// Nothing is visible to other connections until [`Store::commit`]. Dropping
/// a store without committing discards its changes.
#[async_trait]
pub trait Store: Send {
    async fn find_source_type(&mut self, name: &str) -> Result<Option<Id>>;

    async fn insert_source_type(&mut self, name: &str) -> Result<Option<Id>>;

    async fn find_singer(&mut self, name: &str) -> Result<Option<Id>>;

    async fn insert_singer(&mut self, singer: &NewSinger<'_>) -> Result<Option<Id>>;

    async fn find_music_source(&mut self, url: &str) -> Result<Option<Id>>;

    async fn insert_music_source(&mut self, source: &NewMusicSource<'_>) -> Result<Option<Id>>;

    async fn find_song(&mut self, key: &SongKey<'_>) -> Result<Option<Id>>;

    async fn insert_song(&mut self, song: &NewSong<'_>) -> Result<Option<Id>>;

    /// Sets the end offset and bumps the modification timestamp.
    async fn update_song_end(&mut self, song_id: Id, end_seconds: i64) -> Result<()>;

    /// Returns `true` if the pair was not linked before.
    async fn insert_song_singer(&mut self, song_id: Id, singer_id: Id) -> Result<bool>;

    async fn commit(self) -> Result<()>
    where
        Self: Sized;

    async fn rollback(self) -> Result<()>
    where
        Self: Sized;
}
