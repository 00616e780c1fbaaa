use std::path::PathBuf;

use thiserror::Error;

pub type Result<A> = std::result::Result<A, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Encountered io error: `{0}`")]
    IOError(std::io::Error),
    #[error("Failed to create directory `{}`: `{source}`", .path.display())]
    DirError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Source directory does not exist: `{}`", .0.display())]
    MissingSource(PathBuf),
    #[error("Invalid glob pattern: `{0}`")]
    PatternError(glob::PatternError),
    #[error("Failed to load config: `{0}`")]
    ConfigError(Box<figment::Error>),
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::IOError(value)
    }
}

impl From<glob::PatternError> for Error {
    fn from(value: glob::PatternError) -> Self {
        Self::PatternError(value)
    }
}

impl From<figment::Error> for Error {
    fn from(value: figment::Error) -> Self {
        Self::ConfigError(Box::new(value))
    }
}
