use std::path::Path;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SourceEntry {
    pub title: Option<String>,
    pub url: Option<String>,
    pub upload_date: Option<String>,
    #[serde(rename = "sourceType")]
    pub source_type: Option<String>,
    pub thumbnail_url: Option<String>,
    pub songs: Option<Vec<SongEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SongEntry {
    pub title: Option<String>,
    pub start_at: Option<String>,
    pub end_at: Option<String>,
    pub singers: Option<Vec<Option<String>>>,
}

pub fn parse_entries(json: &str) -> Result<Vec<SourceEntry>> {
    Ok(serde_json::from_str(json)?)
}

#[instrument(level = "trace")]
pub fn read_entries(path: &Path) -> Result<Vec<SourceEntry>> {
    let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = parse_entries(&json)?;
    debug!(n_entries = entries.len(), "read input");

    Ok(entries)
}

/// Trimmed value, `None` when absent or blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_parse_full_entry() {
        let entries = parse_entries(
            r#"[{
                "title": "Concert",
                "url": "http://x/1",
                "upload_date": "2023-01-01",
                "sourceType": "video",
                "thumbnail_url": "http://x/1.jpg",
                "view_count": 12,
                "songs": [
                    {"title": "Song A", "start_at": "1:00", "end_at": "1:30", "singers": ["Alice", null]}
                ]
            }]"#,
        )
        .unwrap();

        assert_eq!(
            entries,
            vec![SourceEntry {
                title: Some("Concert".into()),
                url: Some("http://x/1".into()),
                upload_date: Some("2023-01-01".into()),
                source_type: Some("video".into()),
                thumbnail_url: Some("http://x/1.jpg".into()),
                songs: Some(vec![SongEntry {
                    title: Some("Song A".into()),
                    start_at: Some("1:00".into()),
                    end_at: Some("1:30".into()),
                    singers: Some(vec![Some("Alice".into()), None]),
                }]),
            }]
        );
    }

    #[test]
    fn test_parse_missing_and_null_fields() {
        let entries = parse_entries(r#"[{"url": "http://x/1", "songs": null}, {}]"#).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].url.as_deref(), Some("http://x/1"));
        assert_eq!(entries[0].songs, None);
        assert_eq!(entries[1], SourceEntry::default());
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_entries(r#"{"url": "http://x/1"}"#).unwrap_err();
        assert!(matches!(err, Error::Decode(_)), "unexpected error: {err:?}");
    }

    #[test]
    fn test_read_entries_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"url": "http://x/1"}}]"#).unwrap();

        let entries = read_entries(file.path()).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_read_entries_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        let err = read_entries(&path).unwrap_err();
        assert!(matches!(err, Error::Io { .. }), "unexpected error: {err:?}");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  a  ")), Some("a"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
