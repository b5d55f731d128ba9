use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unsupported time literal: {0:?}")]
    InvalidTimeLiteral(String),
    #[error("unsupported date literal: {0:?}")]
    InvalidDate(String),
    #[error("{entity} is missing required field `{field}`")]
    MissingRequiredField {
        entity: &'static str,
        field: &'static str,
    },
    #[error(transparent)]
    Persistence(#[from] database::Error),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed input: {0}")]
    Decode(#[from] serde_json::Error),
}
