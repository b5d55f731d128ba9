use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use tracing::{debug, instrument};

use crate::models::{Id, NewMusicSource, NewSinger, NewSong, SongKey};
use crate::{Result, Store};

/// [`Store`] backed by one PostgreSQL transaction.
///
/// Offsets are whole seconds on the Rust side and `interval` columns in the
/// database. Ids are cast to `bigint` so `serial` and `bigserial` keys both
/// decode.
pub struct PgStore {
    tx: Transaction<'static, Postgres>,
}

impl PgStore {
    pub(crate) fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Store for PgStore {
    #[instrument(skip(self), ret, level = "trace")]
    async fn find_source_type(&mut self, name: &str) -> Result<Option<Id>> {
        let row: Option<(i64,)> =
            sqlx::query_as("select id::bigint from music_source_types where name = $1")
                .bind(name)
                .fetch_optional(&mut *self.tx)
                .await?;

        Ok(row.map(|(id,)| id))
    }

    #[instrument(skip(self), ret, level = "trace")]
    async fn insert_source_type(&mut self, name: &str) -> Result<Option<Id>> {
        let row: Option<(i64,)> = sqlx::query_as(
            "
            insert into music_source_types(name)
            values ($1)
            on conflict do nothing
            returning id::bigint
        ",
        )
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(|(id,)| id))
    }

    #[instrument(skip(self), ret, level = "trace")]
    async fn find_singer(&mut self, name: &str) -> Result<Option<Id>> {
        let row: Option<(i64,)> = sqlx::query_as("select id::bigint from singers where name = $1")
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.map(|(id,)| id))
    }

    #[instrument(skip(self), ret, level = "trace")]
    async fn insert_singer(&mut self, singer: &NewSinger<'_>) -> Result<Option<Id>> {
        let row: Option<(i64,)> = sqlx::query_as(
            "
            insert into singers(public_id, name)
            values ($1, $2)
            on conflict do nothing
            returning id::bigint
        ",
        )
        .bind(singer.public_id)
        .bind(singer.name)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(|(id,)| id))
    }

    #[instrument(skip(self), ret, level = "trace")]
    async fn find_music_source(&mut self, url: &str) -> Result<Option<Id>> {
        let row: Option<(i64,)> =
            sqlx::query_as("select id::bigint from music_sources where url = $1")
                .bind(url)
                .fetch_optional(&mut *self.tx)
                .await?;

        Ok(row.map(|(id,)| id))
    }

    #[instrument(skip(self), ret, level = "trace")]
    async fn insert_music_source(&mut self, source: &NewMusicSource<'_>) -> Result<Option<Id>> {
        let row: Option<(i64,)> = sqlx::query_as(
            "
            insert into music_sources(public_id, title, url, upload_date, type_id, thumbnail_url)
            values ($1, $2, $3, $4, $5, $6)
            on conflict do nothing
            returning id::bigint
        ",
        )
        .bind(source.public_id)
        .bind(source.title)
        .bind(source.url)
        .bind(source.upload_date)
        .bind(source.type_id)
        .bind(source.thumbnail_url)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(|(id,)| id))
    }

    #[instrument(skip(self), ret, level = "trace")]
    async fn find_song(&mut self, key: &SongKey<'_>) -> Result<Option<Id>> {
        let row: Option<(i64,)> = sqlx::query_as(
            "
            select id::bigint from songs
            where source_id = $1
              and title = $2
              and start_at = $3::bigint * interval '1 second'
        ",
        )
        .bind(key.source_id)
        .bind(key.title)
        .bind(key.start_seconds)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(|(id,)| id))
    }

    #[instrument(skip(self), ret, level = "trace")]
    async fn insert_song(&mut self, song: &NewSong<'_>) -> Result<Option<Id>> {
        let row: Option<(i64,)> = sqlx::query_as(
            "
            insert into songs(public_id, source_id, title, start_at, end_at)
            values ($1, $2, $3, $4::bigint * interval '1 second', $5::bigint * interval '1 second')
            on conflict do nothing
            returning id::bigint
        ",
        )
        .bind(song.public_id)
        .bind(song.key.source_id)
        .bind(song.key.title)
        .bind(song.key.start_seconds)
        .bind(song.end_seconds)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(|(id,)| id))
    }

    #[instrument(skip(self), level = "trace")]
    async fn update_song_end(&mut self, song_id: Id, end_seconds: i64) -> Result<()> {
        let result = sqlx::query(
            "
            update songs
               set end_at = $2::bigint * interval '1 second',
                   updated_at = current_timestamp
             where id = $1
        ",
        )
        .bind(song_id)
        .bind(end_seconds)
        .execute(&mut *self.tx)
        .await?;
        debug!(n_rows = result.rows_affected(), "affected rows");

        Ok(())
    }

    #[instrument(skip(self), ret, level = "trace")]
    async fn insert_song_singer(&mut self, song_id: Id, singer_id: Id) -> Result<bool> {
        let result = sqlx::query(
            "
            insert into song_singers(song_id, singer_id)
            values ($1, $2)
            on conflict (song_id, singer_id) do nothing
        ",
        )
        .bind(song_id)
        .bind(singer_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        debug!("transaction committed");

        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        debug!("transaction rolled back");

        Ok(())
    }
}
