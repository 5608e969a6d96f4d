use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Unknown setting: {0}")]
    UnknownSetting(String),
}

pub type Result<T> = std::result::Result<T, Error>;
