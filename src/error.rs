use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovpostError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse LCOV input: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, CovpostError>;
