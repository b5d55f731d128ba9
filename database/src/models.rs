use time::Date;

/// Storage-assigned row key.
pub type Id = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSinger<'a> {
    pub public_id: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMusicSource<'a> {
    pub public_id: &'a str,
    pub title: &'a str,
    pub url: &'a str,
    pub upload_date: Date,
    pub type_id: Id,
    pub thumbnail_url: Option<&'a str>,
}

/// Natural key of a song: one start offset per title within a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SongKey<'a> {
    pub source_id: Id,
    pub title: &'a str,
    pub start_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSong<'a> {
    pub public_id: &'a str,
    pub key: SongKey<'a>,
    pub end_seconds: i64,
}
