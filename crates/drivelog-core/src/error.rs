use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid or tampered id token")]
    InvalidToken,

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

pub type Result<T> = std::result::Result<T, Error>;
