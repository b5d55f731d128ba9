use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    /// An insert lost a race on the natural key and the winning row could not
    /// be read back afterwards.
    #[error("{entity} with key {key:?} was concurrently created but cannot be found")]
    Conflict { entity: &'static str, key: String },
}
