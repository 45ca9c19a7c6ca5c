use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Driving experience not found: {0}")]
    ExperienceNotFound(i64),

    #[error("'{0}' already exists")]
    DuplicateLabel(String),

    #[error("Referenced lookup row does not exist")]
    MissingReference,

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
